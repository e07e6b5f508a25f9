//! # Action Dispatcher / State Machine
//!
//! Routes a typed action to its handler and records the outcome. Each
//! handler independently asserts the starting state it requires; there is
//! no central transition table. The modeled transitions are
//! `Active -> {Cancelled, Claimed via cancel, Withdrawn, Locked, Reserved}`
//! and `Cancelled -> Claimed`; nothing returns a bundle to `Active`.
//!
//! Handlers return `Result<(), ActionError>`; the dispatcher pattern-matches
//! and records `accepted` or `rejected` on the action record, which is
//! persisted whether the handler succeeded or not. Rejections are logged,
//! never propagated raw to the caller.
//!
//! Multi-bundle partial failure: each matched bundle is updated in its own
//! write-through transaction, so a failure partway through leaves earlier
//! mutations committed. The engine is at-least-once per matched bundle, not
//! all-or-nothing per action.

use registry_types::{Account, ActionResponseStatus, CertificateActionType, CertificateStatus};
use tracing::{error, info};

use super::{fetch, select_where, RegistryService};
use crate::cqrs;
use crate::domain::entities::{
    ActionRequest, BundlePatch, GranularCertificateAction, GranularCertificateBundle,
};
use crate::domain::errors::{ActionError, ValidationError};
use crate::domain::query::build_predicate;
use crate::ports::outbound::{AuthClient, EventSink, RegistryStore, TimeSource};

impl<W, M, E, TS, AU> RegistryService<W, M, E, TS, AU>
where
    W: RegistryStore,
    M: RegistryStore,
    E: EventSink,
    TS: TimeSource,
    AU: AuthClient,
{
    pub(crate) fn process_action_impl(
        &mut self,
        request: ActionRequest,
    ) -> Option<GranularCertificateAction> {
        let now = self.time_source.now();
        let mut action = GranularCertificateAction::from_request(request, now);
        info!(
            "[registry] processing {} action for account {}",
            action.action_type, action.source_id
        );

        match self.dispatch(&action) {
            Ok(()) => {
                action.action_response_status = Some(ActionResponseStatus::Accepted);
            }
            Err(err) => {
                error!("[registry] {} action rejected: {err}", action.action_type);
                action.action_response_status = Some(ActionResponseStatus::Rejected);
            }
        }
        action.action_completed_datetime = Some(self.time_source.now());

        // Recorded on both outcomes
        cqrs::write_to_stores(
            vec![action],
            &mut self.write,
            &mut self.mirror,
            &mut self.events,
            now,
        )
        .and_then(|mut persisted| persisted.pop())
    }

    fn dispatch(&mut self, action: &GranularCertificateAction) -> Result<(), ActionError> {
        if !self.auth.authorize(action.user_id, action.source_id) {
            return Err(ActionError::Unauthorized {
                user_id: action.user_id,
                account_id: action.source_id,
            });
        }
        action.validate_shape()?;

        match action.action_type {
            CertificateActionType::Transfer => self.transfer_certificates(action),
            CertificateActionType::Cancel => self.cancel_certificates(action),
            CertificateActionType::Claim => self.claim_certificates(action),
            CertificateActionType::Withdraw => self.withdraw_certificates(action),
            CertificateActionType::Lock => {
                self.set_status_on_matched(action, CertificateStatus::Locked)
            }
            CertificateActionType::Reserve => {
                self.set_status_on_matched(action, CertificateStatus::Reserved)
            }
            CertificateActionType::Query => {
                Err(ActionError::NotDispatchable(action.action_type))
            }
        }
    }

    /// Live bundles held by the source account that match the action's
    /// filter, from the write-of-record store.
    fn matched_bundles(
        &self,
        action: &GranularCertificateAction,
    ) -> Result<Vec<GranularCertificateBundle>, ActionError> {
        action.filter.validate()?;
        let predicate = build_predicate(action.source_id, &action.filter);
        let bundles: Vec<GranularCertificateBundle> = select_where(&*self.write, &predicate)?;
        if bundles.is_empty() {
            return Err(ActionError::NoMatchingCertificates);
        }
        Ok(bundles)
    }

    /// Honour `certificate_quantity`: any matched bundle larger than the
    /// requested quantity is split first, and only the leading child is
    /// acted on.
    fn apply_certificate_quantity(
        &mut self,
        bundles: Vec<GranularCertificateBundle>,
        certificate_quantity: Option<u64>,
    ) -> Result<Vec<GranularCertificateBundle>, ActionError> {
        let Some(quantity) = certificate_quantity else {
            return Ok(bundles);
        };
        let mut selected = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            if bundle.bundle_quantity <= quantity {
                selected.push(bundle);
                continue;
            }
            let (child, _remainder) = self.split_bundle(&bundle, quantity)?;
            selected.push(child);
        }
        Ok(selected)
    }

    fn update_bundle(
        &mut self,
        bundle: &mut GranularCertificateBundle,
        patch: &BundlePatch,
    ) -> Result<(), ActionError> {
        let now = self.time_source.now();
        cqrs::update_entity(
            bundle,
            patch,
            &mut self.write,
            &mut self.mirror,
            &mut self.events,
            now,
        )
        .map(|_| ())
        .ok_or(ActionError::Persistence {
            operation: "update",
        })
    }

    /// Transfer matched bundles to the target account.
    ///
    /// The target must exist and must have whitelisted the source account;
    /// every matched bundle must be `Active`.
    fn transfer_certificates(
        &mut self,
        action: &GranularCertificateAction,
    ) -> Result<(), ActionError> {
        let target_id = action.target_id.ok_or(ValidationError::MissingTarget)?;

        let target: Option<Account> = fetch(&*self.write, target_id)?;
        let target = target
            .filter(|account| !account.is_deleted)
            .ok_or(ActionError::TargetAccountNotFound(target_id))?;
        if !target.account_whitelist.contains(&action.source_id) {
            return Err(ActionError::NotWhitelisted {
                target_id,
                source_id: action.source_id,
            });
        }

        let bundles = self.matched_bundles(action)?;
        if let Some(bundle) = bundles
            .iter()
            .find(|b| b.certificate_status != CertificateStatus::Active)
        {
            return Err(ActionError::WrongStatus {
                action: action.action_type,
                required: "Active",
                found: bundle.certificate_status,
            });
        }

        let to_transfer = self.apply_certificate_quantity(bundles, action.certificate_quantity)?;
        for mut bundle in to_transfer {
            self.update_bundle(&mut bundle, &BundlePatch::account(target_id))?;
        }
        Ok(())
    }

    /// Cancel matched bundles, recording the beneficiary ahead of a claim.
    ///
    /// Accepts bundles in `Active` or `Reserved` state.
    fn cancel_certificates(
        &mut self,
        action: &GranularCertificateAction,
    ) -> Result<(), ActionError> {
        let bundles = self.matched_bundles(action)?;
        if let Some(bundle) = bundles.iter().find(|b| {
            b.certificate_status != CertificateStatus::Active
                && b.certificate_status != CertificateStatus::Reserved
        }) {
            return Err(ActionError::WrongStatus {
                action: action.action_type,
                required: "Active or Reserved",
                found: bundle.certificate_status,
            });
        }

        let to_cancel = self.apply_certificate_quantity(bundles, action.certificate_quantity)?;
        for mut bundle in to_cancel {
            let patch = BundlePatch {
                certificate_status: Some(CertificateStatus::Cancelled),
                beneficiary: action.beneficiary.clone(),
                ..BundlePatch::default()
            };
            self.update_bundle(&mut bundle, &patch)?;
        }
        Ok(())
    }

    /// Claim matched bundles for the beneficiary.
    ///
    /// Only `Cancelled` bundles can be claimed; the required beneficiary is
    /// enforced by shape validation before dispatch.
    fn claim_certificates(
        &mut self,
        action: &GranularCertificateAction,
    ) -> Result<(), ActionError> {
        let bundles = self.matched_bundles(action)?;
        if let Some(bundle) = bundles
            .iter()
            .find(|b| b.certificate_status != CertificateStatus::Cancelled)
        {
            return Err(ActionError::WrongStatus {
                action: action.action_type,
                required: "Cancelled",
                found: bundle.certificate_status,
            });
        }

        let to_claim = self.apply_certificate_quantity(bundles, action.certificate_quantity)?;
        for mut bundle in to_claim {
            // Re-assert per bundle: the set may have been split since the
            // up-front check
            if bundle.certificate_status != CertificateStatus::Cancelled {
                return Err(ActionError::WrongStatus {
                    action: action.action_type,
                    required: "Cancelled",
                    found: bundle.certificate_status,
                });
            }
            self.update_bundle(&mut bundle, &BundlePatch::status(CertificateStatus::Claimed))?;
        }
        Ok(())
    }

    /// Withdraw matched bundles (issuing body only, enforced upstream).
    ///
    /// Withdrawn bundles leave the device's contiguity baseline; their ids
    /// are reissued.
    fn withdraw_certificates(
        &mut self,
        action: &GranularCertificateAction,
    ) -> Result<(), ActionError> {
        self.set_status_on_matched(action, CertificateStatus::Withdrawn)
    }

    /// Shared tail for the plain status actions: withdraw, lock, reserve.
    fn set_status_on_matched(
        &mut self,
        action: &GranularCertificateAction,
        status: CertificateStatus,
    ) -> Result<(), ActionError> {
        let bundles = self.matched_bundles(action)?;
        let selected = self.apply_certificate_quantity(bundles, action.certificate_quantity)?;
        for mut bundle in selected {
            self.update_bundle(&mut bundle, &BundlePatch::status(status))?;
        }
        Ok(())
    }
}
