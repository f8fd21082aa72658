use std::time::Instant;

use tracing::{Instrument, info, info_span};

use super::Middleware;
use crate::handler;
use crate::request::Request;

/// One `tracing` span per request carrying method and path; logs the status
/// and latency when the response is ready.
pub fn trace() -> Middleware {
    Middleware::new(|next| {
        handler::boxed(move |req: Request| {
            let span = info_span!("request", method = %req.method(), path = %req.path());
            let fut = next.call(req);
            async move {
                let started = Instant::now();
                let res = fut.await;
                info!(
                    status = res.status_code().as_u16(),
                    latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
                    "request finished"
                );
                res
            }
            .instrument(span)
        })
    })
}
