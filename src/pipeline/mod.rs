//! Request Pipeline
//!
//! Every command and query is a [`Request`] served by one [`Handler`].
//! A [`Pipeline`] wraps the handler in an ordered list of [`Behavior`]s,
//! each receiving the request and a [`Next`] continuation. The
//! [`Mediator`] routes a request to its pipeline by type and is assembled
//! once at startup.

pub mod behaviors;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

pub use behaviors::{LoggingBehavior, Validate, ValidationBehavior};

/// A command or query
pub trait Request: fmt::Debug + Send + 'static {
    type Response: Send + 'static;

    /// Name used in logs
    const NAME: &'static str;
}

/// Terminal handler of a request
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> AppResult<R::Response>;
}

/// Cross-cutting stage around a handler
#[async_trait]
pub trait Behavior<R: Request>: Send + Sync {
    async fn handle<'a>(&'a self, request: R, next: Next<'a, R>) -> AppResult<R::Response>;
}

/// Remaining behaviors plus the handler
pub struct Next<'a, R: Request> {
    handler: &'a dyn Handler<R>,
    behaviors: &'a [Box<dyn Behavior<R>>],
}

impl<'a, R: Request> Next<'a, R> {
    /// Pass the request on to the rest of the pipeline
    pub async fn run(self, request: R) -> AppResult<R::Response> {
        match self.behaviors.split_first() {
            Some((behavior, rest)) => {
                let next = Next {
                    handler: self.handler,
                    behaviors: rest,
                };
                behavior.handle(request, next).await
            }
            None => self.handler.handle(request).await,
        }
    }
}

/// Handler composed with its behaviors
pub struct Pipeline<R: Request> {
    handler: Box<dyn Handler<R>>,
    behaviors: Vec<Box<dyn Behavior<R>>>,
}

impl<R: Request> Pipeline<R> {
    pub fn new(handler: impl Handler<R> + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            behaviors: Vec::new(),
        }
    }

    /// Append a behavior. The first one added runs outermost.
    pub fn with(mut self, behavior: impl Behavior<R> + 'static) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    pub async fn send(&self, request: R) -> AppResult<R::Response> {
        let next = Next {
            handler: self.handler.as_ref(),
            behaviors: &self.behaviors,
        };
        next.run(request).await
    }
}

/// Dispatches requests to the pipeline registered for their type
#[derive(Default)]
pub struct Mediator {
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Mediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the pipeline for `R`, replacing any previous one
    pub fn register<R: Request>(&mut self, pipeline: Pipeline<R>) {
        self.pipelines.insert(TypeId::of::<R>(), Box::new(pipeline));
    }

    pub fn is_registered<R: Request>(&self) -> bool {
        self.pipelines.contains_key(&TypeId::of::<R>())
    }

    pub async fn send<R: Request>(&self, request: R) -> AppResult<R::Response> {
        let pipeline = self
            .pipelines
            .get(&TypeId::of::<R>())
            .and_then(|pipeline| pipeline.downcast_ref::<Pipeline<R>>())
            .ok_or_else(|| AppError::Internal(format!("No handler registered for {}", R::NAME)))?;

        pipeline.send(request).await
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("pipelines", &self.pipelines.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Echo(i32);

    impl Request for Echo {
        type Response = i32;
        const NAME: &'static str = "Echo";
    }

    struct EchoHandler;

    #[async_trait]
    impl Handler<Echo> for EchoHandler {
        async fn handle(&self, request: Echo) -> AppResult<i32> {
            Ok(request.0)
        }
    }

    /// Records entry/exit so ordering can be asserted
    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Behavior<Echo> for Recorder {
        async fn handle<'a>(&'a self, request: Echo, next: Next<'a, Echo>) -> AppResult<i32> {
            self.log.lock().unwrap().push(format!("enter {}", self.label));
            let result = next.run(Echo(request.0 + 1)).await;
            self.log.lock().unwrap().push(format!("exit {}", self.label));
            result
        }
    }

    struct Reject;

    #[async_trait]
    impl Behavior<Echo> for Reject {
        async fn handle<'a>(&'a self, _request: Echo, _next: Next<'a, Echo>) -> AppResult<i32> {
            Err(AppError::InvalidRequest("rejected".to_string()))
        }
    }

    #[tokio::test]
    async fn test_pipeline_without_behaviors() {
        let pipeline = Pipeline::new(EchoHandler);
        assert_eq!(pipeline.send(Echo(7)).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_behaviors_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(EchoHandler)
            .with(Recorder { label: "outer", log: log.clone() })
            .with(Recorder { label: "inner", log: log.clone() });

        // each recorder increments the request
        assert_eq!(pipeline.send(Echo(0)).await.unwrap(), 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["enter outer", "enter inner", "exit inner", "exit outer"]
        );
    }

    #[tokio::test]
    async fn test_behavior_can_short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(EchoHandler)
            .with(Reject)
            .with(Recorder { label: "never", log: log.clone() });

        let result = pipeline.send(Echo(1)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mediator_dispatch() {
        let mut mediator = Mediator::new();
        assert!(!mediator.is_registered::<Echo>());
        assert!(matches!(mediator.send(Echo(1)).await, Err(AppError::Internal(_))));

        mediator.register(Pipeline::new(EchoHandler));
        assert!(mediator.is_registered::<Echo>());
        assert_eq!(mediator.send(Echo(5)).await.unwrap(), 5);
    }
}
