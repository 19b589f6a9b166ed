//! Typed front over the untyped bus operations.
//!
//! Payloads are converted with serde at the boundary; the wire format is
//! unchanged.

use std::future::Future;
use std::sync::Arc;

use microeditor_protocol::{NotifyMessage, RequestMessage, decode_payload, encode_payload};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{EnvelopeBus, RequestOptions};
use crate::error::{BusError, HandlerFailure};
use crate::registry::RegistrationId;

impl EnvelopeBus {
    /// Sends a typed request and decodes its return.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Payload`] when the parameters cannot be encoded
    /// or the return cannot be decoded, plus every error of
    /// [`EnvelopeBus::request`].
    pub async fn call<M: RequestMessage>(&self, params: &M::Params) -> Result<M::Output, BusError> {
        self.call_with::<M>(params, RequestOptions::default()).await
    }

    /// Typed variant of [`EnvelopeBus::request_with`].
    ///
    /// # Errors
    ///
    /// See [`EnvelopeBus::call`].
    pub async fn call_with<M: RequestMessage>(
        &self,
        params: &M::Params,
        options: RequestOptions,
    ) -> Result<M::Output, BusError> {
        let data = encode_payload(params)
            .map_err(|source| BusError::payload(M::KIND.request_kind(), source))?;
        let returned = self.request_with(M::KIND, data, options).await?;
        decode_payload(returned).map_err(|source| BusError::payload(M::KIND.return_kind(), source))
    }

    /// Sends a typed notification.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Payload`] when the payload cannot be encoded,
    /// plus every error of [`EnvelopeBus::notify`].
    pub fn send<M: NotifyMessage>(&self, payload: &M::Payload) -> Result<(), BusError> {
        let data = encode_payload(payload)
            .map_err(|source| BusError::payload(M::KIND.message_kind(), source))?;
        self.notify(M::KIND, data)
    }

    /// Installs a typed request handler.
    ///
    /// Parameters that fail to decode are answered with a handler error
    /// without invoking `handler`.
    pub fn handle<M, F, Fut>(&self, handler: F) -> bool
    where
        M: RequestMessage + 'static,
        F: Fn(M::Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M::Output, HandlerFailure>> + Send + 'static,
    {
        let shared = Arc::new(handler);
        self.register_request_handler(M::KIND, move |data: Option<Value>| {
            let typed = Arc::clone(&shared);
            async move {
                let params: M::Params = decode_payload(data).map_err(|error| {
                    HandlerFailure::new(format!("invalid parameters for {}: {error}", M::KIND))
                })?;
                let output = typed(params).await?;
                encode_payload(&output).map_err(|error| {
                    HandlerFailure::new(format!("could not encode return of {}: {error}", M::KIND))
                })
            }
        })
    }

    /// Subscribes a typed notification handler.
    ///
    /// Payloads that fail to decode count as handler failures and do not
    /// reach `handler`.
    pub fn subscribe<M, F>(&self, handler: F) -> RegistrationId
    where
        M: NotifyMessage + 'static,
        F: Fn(M::Payload) + Send + Sync + 'static,
    {
        self.register_notify_handler(M::KIND, move |data| {
            let payload: M::Payload = decode_borrowed(data).map_err(|error| {
                HandlerFailure::new(format!("invalid payload for {}: {error}", M::KIND))
            })?;
            handler(payload);
            Ok(())
        })
    }
}

fn decode_borrowed<T: DeserializeOwned>(data: Option<&Value>) -> Result<T, serde_json::Error> {
    T::deserialize(data.unwrap_or(&Value::Null))
}
