//! # Query Service
//!
//! Read-side access over the mirror store. A filter that matches nothing
//! yields an empty response, never an error; the same filter against an
//! unchanged store yields the same result set.

use super::{select_where, RegistryService};
use crate::domain::entities::GranularCertificateBundle;
use crate::domain::errors::ActionError;
use crate::domain::query::{build_predicate, CertificateQueryRequest, CertificateQueryResponse};
use crate::ports::outbound::{AuthClient, EventSink, RegistryStore, TimeSource};

impl<W, M, E, TS, AU> RegistryService<W, M, E, TS, AU>
where
    W: RegistryStore,
    M: RegistryStore,
    E: EventSink,
    TS: TimeSource,
    AU: AuthClient,
{
    pub(crate) fn query_certificate_bundles_impl(
        &self,
        request: CertificateQueryRequest,
    ) -> Result<CertificateQueryResponse, ActionError> {
        if !self.auth.authorize(request.user_id, request.source_id) {
            return Err(ActionError::Unauthorized {
                user_id: request.user_id,
                account_id: request.source_id,
            });
        }
        request.filter.validate()?;

        let predicate = build_predicate(request.source_id, &request.filter);
        let bundles: Vec<GranularCertificateBundle> = select_where(&*self.mirror, &predicate)?;
        Ok(CertificateQueryResponse::from_bundles(bundles))
    }
}
