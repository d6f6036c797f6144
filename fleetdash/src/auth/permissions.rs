//! Permission checks.
//!
//! Two levels exist: staff users may read everything, other authenticated users may read only
//! their own profile. Handlers state their requirement in the type of a [`RequiresPermission`]
//! argument, so unauthorized requests are rejected before the handler body runs.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::instrument;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    errors::{Error, Result},
    types::{Operation, Permission, Resource},
};

/// Type-level resources for [`RequiresPermission`]
pub mod resource {
    use crate::types::Resource;

    pub trait ResourceMarker {
        const RESOURCE: Resource;
    }

    pub struct Dashboard;
    pub struct Users;
    pub struct Profile;

    impl ResourceMarker for Dashboard {
        const RESOURCE: Resource = Resource::Dashboard;
    }
    impl ResourceMarker for Users {
        const RESOURCE: Resource = Resource::Users;
    }
    impl ResourceMarker for Profile {
        const RESOURCE: Resource = Resource::Profile;
    }
}

/// Type-level operations for [`RequiresPermission`]
pub mod operation {
    use crate::types::Operation;

    pub trait OperationMarker {
        const OPERATION: Operation;
    }

    pub struct ReadAll;
    pub struct ReadOwn;

    impl OperationMarker for ReadAll {
        const OPERATION: Operation = Operation::ReadAll;
    }
    impl OperationMarker for ReadOwn {
        const OPERATION: Operation = Operation::ReadOwn;
    }
}

/// Whether `user` may perform `operation` on `resource`
pub fn has_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    if user.is_admin() {
        return true;
    }
    matches!((resource, operation), (Resource::Profile, Operation::ReadOwn))
}

/// Fail with 403 unless `user` may perform `operation` on `resource`
pub fn require_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> Result<()> {
    if has_permission(user, resource, operation) {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            required: Permission::Staff,
            action: operation,
            resource,
        })
    }
}

/// Extractor that authenticates the caller and checks a permission.
///
/// Rejects with 401 when no valid identity is present and 403 when the identity lacks the permission.
pub struct RequiresPermission<R, O> {
    pub user: CurrentUser,
    _marker: PhantomData<(R, O)>,
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: resource::ResourceMarker + Send + Sync,
    O: operation::OperationMarker + Send + Sync,
{
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require_permission(&user, R::RESOURCE, O::OPERATION)?;
        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}
