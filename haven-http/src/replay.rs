use futures::future::BoxFuture;
use haven::OfflineAction;
use haven_core::Upstream;

use crate::{FetchError, FetchRequest, Network};

/// Replays queued actions over a [`Network`].
///
/// A replay succeeds only on a 2xx answer; any other status is reported as
/// [`FetchError::Status`] so the action stays queued.
#[derive(Debug, Clone)]
pub struct ReplayUpstream<N> {
    network: N,
}

impl<N> ReplayUpstream<N> {
    pub fn new(network: N) -> Self {
        Self { network }
    }

    pub fn into_inner(self) -> N {
        self.network
    }
}

impl<N> Upstream<OfflineAction> for ReplayUpstream<N>
where
    N: Network,
    N::Future: 'static,
{
    type Response = Result<(), FetchError>;
    type Future = BoxFuture<'static, Self::Response>;

    fn call(&mut self, action: OfflineAction) -> Self::Future {
        let request = match FetchRequest::try_from(&action) {
            Ok(request) => request,
            Err(error) => return Box::pin(async move { Err(error) }),
        };
        let response = self.network.call(request);
        Box::pin(async move {
            let response = response.await?;
            if response.is_success() {
                Ok(())
            } else {
                Err(FetchError::Status(response.status))
            }
        })
    }
}
