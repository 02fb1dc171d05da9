use async_trait::async_trait;
use tracing::debug;

use mdui_connect::{MetadataUiLocator, ServiceDirectory, ServiceResolver};
use mdui_slo::{
    errors::{self, WithBacktrace, CODE_UNAUTHZ_SERVICE},
    Result,
};

use crate::{
    params::RequestParameters,
    scope::{put_service_ui_metadata, put_unauthorized_redirect_url, FlowScope},
};

/// Request parameter carrying the SAML service provider entity id.
pub const DEFAULT_ENTITY_ID_PARAMETER: &str = "entityId";

/// The service provider was unknown to the registry or refused by its
/// access strategy. Both cases are reported the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnauthorizedService {
    pub entity_id: String,
    pub code: &'static str,
}

impl From<UnauthorizedService> for WithBacktrace {
    fn from(value: UnauthorizedService) -> Self {
        errors::unauthorized_service(&value.entity_id)
    }
}

/// FlowOutcome is what a step signals back to the enclosing flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Continue,
    Unauthorized(UnauthorizedService),
}

impl FlowOutcome {
    pub fn unauthorized(entity_id: &str) -> Self {
        Self::Unauthorized(UnauthorizedService {
            entity_id: entity_id.to_owned(),
            code: CODE_UNAUTHZ_SERVICE,
        })
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Folds a denial into the error channel for callers that route every
    /// failure through one path.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Continue => Ok(()),
            Self::Unauthorized(denied) => Err(denied.into()),
        }
    }
}

/// A single step of the login web flow.
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(
        &self,
        params: &dyn RequestParameters,
        scope: &mut FlowScope,
    ) -> Result<FlowOutcome>;
}

/// MetadataUiParserAction authorizes the service provider named by the
/// entity id parameter and, when it is allowed in, publishes its MDUI
/// bundle into the flow scope so the login page can brand itself.
///
/// Collaborator failures are returned untouched; the step neither retries
/// nor falls back.
#[derive(Debug)]
pub struct MetadataUiParserAction<R, D, L> {
    entity_id_parameter_name: String,
    resolver: R,
    directory: D,
    locator: L,
}

impl<R, D, L> MetadataUiParserAction<R, D, L>
where
    R: ServiceResolver,
    D: ServiceDirectory,
    L: MetadataUiLocator,
{
    pub fn new(
        entity_id_parameter_name: impl Into<String>,
        resolver: R,
        directory: D,
        locator: L,
    ) -> Self {
        Self {
            entity_id_parameter_name: entity_id_parameter_name.into(),
            resolver,
            directory,
            locator,
        }
    }

    pub fn entity_id_parameter_name(&self) -> &str {
        &self.entity_id_parameter_name
    }

    pub async fn do_execute<P>(
        &self,
        params: &P,
        scope: &mut FlowScope,
    ) -> Result<FlowOutcome>
    where
        P: RequestParameters + ?Sized,
    {
        let entity_id = match params.parameter(&self.entity_id_parameter_name)
        {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                debug!(
                    "No entity id found for parameter [{}]",
                    self.entity_id_parameter_name
                );
                return Ok(FlowOutcome::Continue);
            }
        };

        let service = self.resolver.resolve(entity_id);
        let registered_service =
            match self.directory.find_by_identity(&service).await? {
                Some(found) if found.is_access_allowed() => found,
                found => {
                    debug!(
                        "Entity id [{}] is not recognized/allowed by the service registry",
                        entity_id
                    );
                    if let Some(denied) = found {
                        put_unauthorized_redirect_url(
                            scope,
                            denied.unauthorized_redirect_url(),
                        )?;
                    }
                    return Ok(FlowOutcome::unauthorized(entity_id));
                }
            };

        let mdui = self.locator.locate(entity_id, &registered_service).await?;
        put_service_ui_metadata(scope, mdui.as_ref())?;
        Ok(FlowOutcome::Continue)
    }
}

#[async_trait]
impl<R, D, L> Action for MetadataUiParserAction<R, D, L>
where
    R: ServiceResolver,
    D: ServiceDirectory,
    L: MetadataUiLocator,
{
    async fn execute(
        &self,
        params: &dyn RequestParameters,
        scope: &mut FlowScope,
    ) -> Result<FlowOutcome> {
        self.do_execute(params, scope).await
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use mdui_connect::{
        AccessStrategy, Logo, MockMetadataUiLocator, MockServiceDirectory,
        MockServiceResolver, RegisteredService, ServiceIdentity, UiMetadata,
    };
    use mdui_slo::errors::Code;

    use super::*;
    use crate::scope::{
        get_service_ui_metadata, get_unauthorized_redirect_url,
        SERVICE_UI_METADATA, UNAUTHORIZED_REDIRECT_URL,
    };

    type TestAction = MetadataUiParserAction<
        MockServiceResolver,
        MockServiceDirectory,
        MockMetadataUiLocator,
    >;

    fn params(entity_id: &str) -> Vec<(String, String)> {
        vec![("entityId".to_owned(), entity_id.to_owned())]
    }

    fn resolver() -> MockServiceResolver {
        let mut resolver = MockServiceResolver::new();
        resolver
            .expect_resolve()
            .returning(|entity_id| ServiceIdentity::new(entity_id));
        resolver
    }

    fn registered(
        enabled: bool,
        unauthorized_redirect_url: Option<&str>,
    ) -> RegisteredService {
        RegisteredService {
            id: 1,
            service_id: "https://sp\\.example".to_owned(),
            name: "sp".to_owned(),
            access_strategy: AccessStrategy {
                enabled,
                unauthorized_redirect_url: unauthorized_redirect_url
                    .map(str::to_owned),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn directory_with(
        service: Option<RegisteredService>,
    ) -> MockServiceDirectory {
        let mut directory = MockServiceDirectory::new();
        directory
            .expect_find_by_identity()
            .returning(move |_| Ok(service.clone()));
        directory
    }

    fn untouched_directory() -> MockServiceDirectory {
        let mut directory = MockServiceDirectory::new();
        directory.expect_find_by_identity().never();
        directory
    }

    fn untouched_locator() -> MockMetadataUiLocator {
        let mut locator = MockMetadataUiLocator::new();
        locator.expect_locate().never();
        locator
    }

    fn example_mdui() -> UiMetadata {
        UiMetadata {
            display_name: Some("Example SP".to_owned()),
            logo: Some(Logo {
                url: "https://sp.example/logo.png".to_owned(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_parameter_continues_silently() {
        let mut resolver = MockServiceResolver::new();
        resolver.expect_resolve().never();
        let action: TestAction = MetadataUiParserAction::new(
            "entityId",
            resolver,
            untouched_directory(),
            untouched_locator(),
        );

        let mut scope = FlowScope::new();
        let outcome = action
            .do_execute(&Vec::<(String, String)>::new(), &mut scope)
            .await
            .unwrap();

        assert_eq!(outcome, FlowOutcome::Continue);
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn blank_parameter_continues_silently() {
        for blank in ["", "   ", "\t\n"] {
            let mut resolver = MockServiceResolver::new();
            resolver.expect_resolve().never();
            let action: TestAction = MetadataUiParserAction::new(
                "entityId",
                resolver,
                untouched_directory(),
                untouched_locator(),
            );

            let mut scope = FlowScope::new();
            let outcome =
                action.do_execute(&params(blank), &mut scope).await.unwrap();

            assert!(outcome.is_continue());
            assert!(scope.is_empty());
        }
    }

    #[tokio::test]
    async fn parameter_name_is_configurable() {
        let mut locator = MockMetadataUiLocator::new();
        locator.expect_locate().times(1).returning(|_, _| Ok(None));
        let action = MetadataUiParserAction::new(
            "sp",
            resolver(),
            directory_with(Some(registered(true, None))),
            locator,
        );
        assert_eq!(action.entity_id_parameter_name(), "sp");

        let mut scope = FlowScope::new();
        let by_default_name = action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap();
        assert!(by_default_name.is_continue());
        assert!(scope.is_empty());

        let custom = vec![("sp".to_owned(), "https://sp.example".to_owned())];
        action.do_execute(&custom, &mut scope).await.unwrap();
        assert!(scope.contains_key(SERVICE_UI_METADATA));
    }

    #[tokio::test]
    async fn unknown_service_is_unauthorized_without_redirect() {
        let mut directory = MockServiceDirectory::new();
        directory
            .expect_find_by_identity()
            .withf(|identity| identity.id == "https://evil.example")
            .times(1)
            .returning(|_| Ok(None));
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory,
            untouched_locator(),
        );

        let mut scope = FlowScope::new();
        let outcome = action
            .do_execute(&params("https://evil.example"), &mut scope)
            .await
            .unwrap();

        assert_eq!(outcome, FlowOutcome::unauthorized("https://evil.example"));
        assert!(!scope.contains_key(UNAUTHORIZED_REDIRECT_URL));
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn denied_service_publishes_redirect_then_fails() {
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(Some(registered(
                false,
                Some("https://sp.example/denied"),
            ))),
            untouched_locator(),
        );

        let mut scope = FlowScope::new();
        let outcome = action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap();

        match outcome {
            FlowOutcome::Unauthorized(denied) => {
                assert_eq!(denied.entity_id, "https://sp.example");
                assert_eq!(denied.code, CODE_UNAUTHZ_SERVICE);
            }
            FlowOutcome::Continue => panic!("denied service continued"),
        }
        assert_eq!(
            get_unauthorized_redirect_url(&scope).unwrap().as_deref(),
            Some("https://sp.example/denied")
        );
        assert!(!scope.contains_key(SERVICE_UI_METADATA));
    }

    #[tokio::test]
    async fn denied_service_without_redirect_publishes_absent_url() {
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(Some(registered(false, None))),
            untouched_locator(),
        );

        let mut scope = FlowScope::new();
        let outcome = action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap();

        assert!(!outcome.is_continue());
        assert!(scope.contains_key(UNAUTHORIZED_REDIRECT_URL));
        assert_eq!(get_unauthorized_redirect_url(&scope).unwrap(), None);
    }

    #[tokio::test]
    async fn denied_service_with_empty_redirect_publishes_it_verbatim() {
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(Some(registered(false, Some("")))),
            untouched_locator(),
        );

        let mut scope = FlowScope::new();
        action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap();

        assert_eq!(
            get_unauthorized_redirect_url(&scope).unwrap().as_deref(),
            Some("")
        );
    }

    #[tokio::test]
    async fn allowed_service_publishes_located_mdui() {
        let mut locator = MockMetadataUiLocator::new();
        locator
            .expect_locate()
            .withf(|entity_id, service| {
                entity_id == "https://sp.example" && service.id == 1
            })
            .times(1)
            .returning(|_, _| Ok(Some(example_mdui())));
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(Some(registered(true, Some("https://ignored")))),
            locator,
        );

        let mut scope = FlowScope::new();
        let outcome = action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap();

        assert_eq!(outcome, FlowOutcome::Continue);
        assert_eq!(
            get_service_ui_metadata(&scope).unwrap(),
            Some(example_mdui())
        );
        assert!(!scope.contains_key(UNAUTHORIZED_REDIRECT_URL));
    }

    #[tokio::test]
    async fn allowed_service_without_mdui_publishes_none() {
        let mut locator = MockMetadataUiLocator::new();
        locator.expect_locate().times(1).returning(|_, _| Ok(None));
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(Some(registered(true, None))),
            locator,
        );

        let mut scope = FlowScope::new();
        let outcome = action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap();

        assert!(outcome.is_continue());
        assert!(scope.contains_key(SERVICE_UI_METADATA));
        assert_eq!(get_service_ui_metadata(&scope).unwrap(), None);
    }

    #[tokio::test]
    async fn directory_failure_propagates() {
        let mut directory = MockServiceDirectory::new();
        directory.expect_find_by_identity().returning(|_| {
            Err(errors::any(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "registry unavailable",
            )))
        });
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory,
            untouched_locator(),
        );

        let mut scope = FlowScope::new();
        let err = action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap_err();

        assert!(!err.is_unauthorized_service());
        assert!(matches!(err.as_code(), Code::Any(_)));
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn locator_failure_propagates() {
        let mut locator = MockMetadataUiLocator::new();
        locator
            .expect_locate()
            .returning(|_, _| Err(errors::not_found("metadata source")));
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(Some(registered(true, None))),
            locator,
        );

        let mut scope = FlowScope::new();
        let err = action
            .do_execute(&params("https://sp.example"), &mut scope)
            .await
            .unwrap_err();

        assert!(matches!(err.as_code(), Code::NotFound(_)));
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_publish_identical_state() {
        let mut locator = MockMetadataUiLocator::new();
        locator
            .expect_locate()
            .times(2)
            .returning(|_, _| Ok(Some(example_mdui())));
        let action = MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(Some(registered(true, None))),
            locator,
        );

        let mut first = FlowScope::new();
        let mut second = FlowScope::new();
        let a = action
            .do_execute(&params("https://sp.example"), &mut first)
            .await
            .unwrap();
        let b = action
            .do_execute(&params("https://sp.example"), &mut second)
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn runs_through_the_action_trait() {
        let action: Box<dyn Action> = Box::new(MetadataUiParserAction::new(
            "entityId",
            resolver(),
            directory_with(None),
            untouched_locator(),
        ));

        let mut scope = FlowScope::new();
        let outcome = action
            .execute(&params("https://evil.example"), &mut scope)
            .await
            .unwrap();

        let err = outcome.into_result().unwrap_err();
        assert!(err.is_unauthorized_service());
        assert_eq!(
            err.to_string(),
            "Entity [https://evil.example] not recognized"
        );
    }
}
