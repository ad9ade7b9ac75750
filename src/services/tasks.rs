//! Requests issued to the analysis service and the events their tasks send back.
//!
//! Each call runs in its own tokio task and reports exactly one
//! [`ServiceEvent`] on the event loop's channel. Nothing here touches view
//! state, so a response is applied atomically when the loop receives it.

use crate::core::{AnalysisResult, DatasetRef, RequestId};
use crate::services::api_client::{AnalysisService, ApiError};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

/// A column probe to issue for `dataset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub id: RequestId,
    pub dataset: DatasetRef,
}

impl ProbeRequest {
    pub fn new(dataset: DatasetRef) -> Self {
        Self {
            id: RequestId::new(),
            dataset,
        }
    }
}

/// Result of a column probe, tagged with the dataset it was issued for
#[derive(Debug)]
pub struct ProbeOutcome {
    pub id: RequestId,
    pub dataset: DatasetRef,
    pub result: Result<Vec<String>, ApiError>,
}

/// An analyze call to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub id: RequestId,
    pub dataset: DatasetRef,
    pub target: String,
}

impl AnalyzeRequest {
    pub fn new(dataset: DatasetRef, target: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            dataset,
            target: target.into(),
        }
    }
}

#[derive(Debug)]
pub struct AnalyzeOutcome {
    pub id: RequestId,
    pub target: String,
    pub result: Result<AnalysisResult, ApiError>,
}

/// Completion of a background service call
#[derive(Debug)]
pub enum ServiceEvent {
    ColumnsProbed(ProbeOutcome),
    AnalysisFinished(AnalyzeOutcome),
    HealthChecked(Result<String, ApiError>),
}

fn send(tx: &UnboundedSender<ServiceEvent>, event: ServiceEvent) {
    if tx.send(event).is_err() {
        // The loop has shut down; nobody is waiting for this response
        warn!("Dropping service response: event loop closed");
    }
}

pub fn spawn_probe<S: AnalysisService>(
    service: Arc<S>,
    request: ProbeRequest,
    tx: UnboundedSender<ServiceEvent>,
) -> JoinHandle<()> {
    let span = info_span!("probe", request_id = %request.id, file = %request.dataset.file_name);
    tokio::spawn(
        async move {
            debug!("Probing columns");
            let result = service.probe_columns(&request.dataset).await;
            send(
                &tx,
                ServiceEvent::ColumnsProbed(ProbeOutcome {
                    id: request.id,
                    dataset: request.dataset,
                    result,
                }),
            );
        }
        .instrument(span),
    )
}

pub fn spawn_analyze<S: AnalysisService>(
    service: Arc<S>,
    request: AnalyzeRequest,
    tx: UnboundedSender<ServiceEvent>,
) -> JoinHandle<()> {
    let span = info_span!("analyze", request_id = %request.id, target = %request.target);
    tokio::spawn(
        async move {
            debug!("Requesting decomposition");
            let result = service.analyze(&request.dataset, &request.target).await;
            send(
                &tx,
                ServiceEvent::AnalysisFinished(AnalyzeOutcome {
                    id: request.id,
                    target: request.target,
                    result,
                }),
            );
        }
        .instrument(span),
    )
}

pub fn spawn_health<S: AnalysisService>(
    service: Arc<S>,
    tx: UnboundedSender<ServiceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            let result = service.health().await;
            send(&tx, ServiceEvent::HealthChecked(result));
        }
        .instrument(info_span!("health")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Contribution;
    use tokio::sync::mpsc;

    struct EchoService;

    impl AnalysisService for EchoService {
        async fn probe_columns(&self, dataset: &DatasetRef) -> Result<Vec<String>, ApiError> {
            Ok(vec![dataset.file_name.clone()])
        }

        async fn analyze(
            &self,
            _dataset: &DatasetRef,
            target: &str,
        ) -> Result<AnalysisResult, ApiError> {
            Ok(AnalysisResult::new(
                target,
                0.1,
                vec![Contribution::new("x", 0.1)],
            ))
        }

        async fn health(&self) -> Result<String, ApiError> {
            Err(ApiError::Service {
                status: 503,
                message: None,
            })
        }
    }

    #[tokio::test]
    async fn test_probe_task_reports_its_dataset() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = ProbeRequest::new(DatasetRef::new("/data/a.csv", 10));
        let id = request.id;

        spawn_probe(Arc::new(EchoService), request, tx).await.unwrap();

        match rx.recv().await {
            Some(ServiceEvent::ColumnsProbed(outcome)) => {
                assert_eq!(outcome.id, id);
                assert_eq!(outcome.dataset.file_name, "a.csv");
                assert_eq!(outcome.result.unwrap(), vec!["a.csv".to_string()]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_task_reports_target() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = AnalyzeRequest::new(DatasetRef::new("/data/a.csv", 10), "churn");

        spawn_analyze(Arc::new(EchoService), request, tx).await.unwrap();

        match rx.recv().await {
            Some(ServiceEvent::AnalysisFinished(outcome)) => {
                assert_eq!(outcome.target, "churn");
                assert_eq!(outcome.result.unwrap().target, "churn");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closed_channel_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        spawn_health(Arc::new(EchoService), tx).await.unwrap();
    }
}
