//! 测试辅助模块
//!
//! 提供脚本化的 mock resolver，按 (name, type) 返回预设结果。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dns_inspector_provider::{
    AnswerSet, DohResolver, ProviderError, RawAnswer, RecordType, ResolverKind, ResolverMetadata,
};

pub const MOCK_TTL: u32 = 300;

enum Scripted {
    Answer(AnswerSet),
    Fail(ProviderError),
}

/// Scripted resolver. Unscripted queries answer with no records.
pub struct MockResolver {
    name: String,
    responses: HashMap<(String, RecordType), Scripted>,
    fail_everything: bool,
    delay: Option<Duration>,
    type_delays: HashMap<RecordType, Duration>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: HashMap::new(),
            fail_everything: false,
            delay: None,
            type_delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer `name`/`record_type` with one record per payload, owner `name.`.
    #[must_use]
    pub fn answer(self, name: &str, record_type: RecordType, data: &[&str]) -> Self {
        let answers = data
            .iter()
            .map(|d| raw_answer(&format!("{name}."), record_type, d, MOCK_TTL))
            .collect();
        self.respond(name, record_type, answers, false)
    }

    /// Same as [`answer`](Self::answer) with the AD flag set.
    #[must_use]
    pub fn answer_authenticated(self, name: &str, record_type: RecordType, data: &[&str]) -> Self {
        let answers = data
            .iter()
            .map(|d| raw_answer(&format!("{name}."), record_type, d, MOCK_TTL))
            .collect();
        self.respond(name, record_type, answers, true)
    }

    #[must_use]
    pub fn respond(
        mut self,
        name: &str,
        record_type: RecordType,
        answers: Vec<RawAnswer>,
        authenticated_data: bool,
    ) -> Self {
        self.responses.insert(
            (name.to_string(), record_type),
            Scripted::Answer(AnswerSet {
                answers,
                authenticated_data,
            }),
        );
        self
    }

    /// Fail `name`/`record_type` with a network error.
    #[must_use]
    pub fn fail(mut self, name: &str, record_type: RecordType) -> Self {
        let error = self.network_error();
        self.responses
            .insert((name.to_string(), record_type), Scripted::Fail(error));
        self
    }

    /// Fail every query with a network error.
    #[must_use]
    pub fn fail_all(mut self) -> Self {
        self.fail_everything = true;
        self
    }

    /// Delay every answer.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay answers for one record type only.
    #[must_use]
    pub fn delay_type(mut self, record_type: RecordType, delay: Duration) -> Self {
        self.type_delays.insert(record_type, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn network_error(&self) -> ProviderError {
        ProviderError::NetworkError {
            provider: self.name.clone(),
            detail: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl DohResolver for MockResolver {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self) -> &str {
        "https://mock.invalid/dns-query"
    }

    fn metadata() -> ResolverMetadata {
        ResolverMetadata {
            id: ResolverKind::Google,
            name: "Mock".to_string(),
            description: "Scripted test resolver".to_string(),
            default_endpoint: "https://mock.invalid/dns-query".to_string(),
            accept: None,
        }
    }

    async fn query(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> dns_inspector_provider::Result<AnswerSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.type_delays.get(&record_type).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        if self.fail_everything {
            return Err(self.network_error());
        }

        match self.responses.get(&(domain.to_string(), record_type)) {
            Some(Scripted::Answer(set)) => Ok(set.clone()),
            Some(Scripted::Fail(error)) => Err(error.clone()),
            None => Ok(AnswerSet::default()),
        }
    }
}

pub fn raw_answer(name: &str, record_type: RecordType, data: &str, ttl: u32) -> RawAnswer {
    RawAnswer {
        name: name.to_string(),
        record_type,
        data: data.to_string(),
        ttl,
    }
}

/// Coerce a list of mocks into the resolver list the services take.
pub fn resolvers(mocks: &[&Arc<MockResolver>]) -> Vec<Arc<dyn DohResolver>> {
    mocks
        .iter()
        .map(|m| Arc::clone(*m) as Arc<dyn DohResolver>)
        .collect()
}
