//! State handed to every handler through `State<Arc<GatewayState<C>>>`.

use std::sync::Arc;

use labseat_control::ControlPlane;

use crate::config::GatewayConfig;

/// The provisioning service plus the HTTP settings the router was built with.
///
/// Generic over the [`ControlPlane`] so router tests can run against any
/// implementation.
pub struct GatewayState<C>
where
    C: ControlPlane,
{
    /// DNS, proxy, seat and user operations.
    pub control: Arc<C>,
    /// Listen address, CORS, body limit and request timeout.
    pub config: GatewayConfig,
}

impl<C> GatewayState<C>
where
    C: ControlPlane,
{
    /// Wrap a control plane and its HTTP settings.
    #[must_use]
    pub fn new(control: Arc<C>, config: GatewayConfig) -> Self {
        Self { control, config }
    }
}

impl<C> Clone for GatewayState<C>
where
    C: ControlPlane,
{
    fn clone(&self) -> Self {
        Self {
            control: Arc::clone(&self.control),
            config: self.config.clone(),
        }
    }
}
