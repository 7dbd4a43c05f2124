//! User-agent product propagation onto outgoing requests.

use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::BeforeTransmitInterceptorContextMut;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;

use crate::types::UserAgentProduct;

const USER_AGENT_HEADER: &str = "user-agent";

/// Render products as `name/version (extra1; extra2)` tokens joined with
/// spaces. Products with an empty name are skipped.
pub(crate) fn user_agent_fragment(products: &[UserAgentProduct]) -> String {
    let mut tokens = Vec::with_capacity(products.len());
    for product in products {
        if product.name.is_empty() {
            continue;
        }
        let mut token = if product.version.is_empty() {
            product.name.clone()
        } else {
            format!("{}/{}", product.name, product.version)
        };
        if !product.extra.is_empty() {
            token.push_str(&format!(" ({})", product.extra.join("; ")));
        }
        tokens.push(token);
    }
    tokens.join(" ")
}

/// Appends the configured product list to the user-agent header.
///
/// Runs after signing so the header set by the SDK's own user-agent stage is
/// already in place; the user-agent header is excluded from the signature.
#[derive(Debug)]
pub(crate) struct UserAgentProductsInterceptor {
    fragment: String,
}

impl UserAgentProductsInterceptor {
    pub(crate) fn new(products: &[UserAgentProduct]) -> Self {
        Self {
            fragment: user_agent_fragment(products),
        }
    }
}

impl Intercept for UserAgentProductsInterceptor {
    fn name(&self) -> &'static str {
        "UserAgentProductsInterceptor"
    }

    fn modify_before_transmit(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        if self.fragment.is_empty() {
            return Ok(());
        }
        let headers = context.request_mut().headers_mut();
        let merged = match headers.get(USER_AGENT_HEADER) {
            Some(existing) => format!("{existing} {}", self.fragment),
            None => self.fragment.clone(),
        };
        headers.try_insert(USER_AGENT_HEADER, merged)?;
        Ok(())
    }
}
