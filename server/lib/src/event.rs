//! An event is a request made to the server, after it has been parsed and validated,
//! along with the identity that made it. A [`SearchEvent`] is only constructed from a
//! well formed request, so nothing that processes one needs to re-check the request.

use ldap3_proto::proto::{LdapFilter, LdapSearchScope};
use ldap3_proto::simple::SearchRequest;

use crate::prelude::*;
use crate::schema::Schema;
use crate::server::identity::Identity;
use crate::server::select::RequestedAttrs;
use crate::utils::normalise_dn;

#[derive(Debug, Clone)]
pub struct SearchEvent {
    pub ident: Identity,
    pub base: String,
    pub scope: LdapSearchScope,
    pub filter: LdapFilter,
    pub attrs: RequestedAttrs,
    /// Problems with the request that did not prevent it being processed.
    pub warnings: Vec<OperationError>,
}

impl SearchEvent {
    pub fn new(
        ident: Identity,
        base: &str,
        scope: LdapSearchScope,
        filter: LdapFilter,
        attrs: &[String],
        schema: &Schema,
    ) -> Result<Self, OperationError> {
        normalise_dn(base).map_err(|e| {
            request_error!(?base, ?e, "invalid search base");
            OperationError::InvalidRequest(format!("invalid search base '{base}'"))
        })?;

        let (attrs, warnings) = RequestedAttrs::parse(attrs, schema)?;

        Ok(SearchEvent {
            ident,
            base: base.to_string(),
            scope,
            filter,
            attrs,
            warnings,
        })
    }

    pub fn from_ldap(
        sr: &SearchRequest,
        ident: Identity,
        schema: &Schema,
    ) -> Result<Self, OperationError> {
        Self::new(
            ident,
            &sr.base,
            sr.scope.clone(),
            sr.filter.clone(),
            &sr.attrs,
            schema,
        )
    }

    /// A search that is not subject to access controls.
    pub fn new_internal(
        base: &str,
        scope: LdapSearchScope,
        filter: LdapFilter,
        attrs: &[&str],
    ) -> Result<Self, OperationError> {
        let attrs: Vec<String> = attrs.iter().map(|s| s.to_string()).collect();
        Self::new(
            Identity::from_internal(),
            base,
            scope,
            filter,
            &attrs,
            Schema::core(),
        )
    }
}
