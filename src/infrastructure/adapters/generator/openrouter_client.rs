//! OpenRouter Client - 调用 OpenRouter 文本补全服务
//!
//! 实现 JokeGeneratorPort trait，通过 HTTP 调用 chat completions 接口
//!
//! 外部 API:
//! POST https://openrouter.ai/api/v1/chat/completions
//! Request: {"model": "...", "messages": [...], "max_tokens": 250, ...}  (JSON)
//! Response: {"choices": [{"message": {"content": "..."}}], "usage": {"total_tokens": 123}}
//!
//! 同一时刻只有一个请求在途，相邻两次请求之间至少间隔 `cooldown`。

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::application::ports::{GeneratedJoke, GenerationError, JokeGeneratorPort};
use crate::domain::joke::{clean_joke_text, user_prompt, SYSTEM_PROMPT};

/// 错误响应体在日志/错误中保留的最大字符数
const MAX_ERROR_BODY_CHARS: usize = 500;

/// 补全请求体 (JSON)
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// 补全响应体
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    total_tokens: i64,
}

/// OpenRouter 客户端配置
#[derive(Debug, Clone)]
pub struct OpenRouterClientConfig {
    /// chat completions 接口地址
    pub api_url: String,
    /// API Key
    pub api_key: String,
    /// 模型名称
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 相邻两次请求的最小间隔
    pub cooldown: Duration,
    /// HTTP-Referer 头
    pub referer: String,
    /// X-Title 头
    pub title: String,
}

impl Default for OpenRouterClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "deepseek/deepseek-chat".to_string(),
            max_tokens: 250,
            temperature: 0.85,
            top_p: 0.9,
            timeout_secs: 30,
            cooldown: Duration::from_secs(5),
            referer: "https://t.me/anekdotych_bot".to_string(),
            title: "Anekdotych Telegram Bot".to_string(),
        }
    }
}

impl OpenRouterClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// 距离冷却结束还需等待的时间
fn cooldown_remaining(last_request: Option<Instant>, now: Instant, cooldown: Duration) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last_request?);
    cooldown.checked_sub(elapsed).filter(|wait| !wait.is_zero())
}

/// 截断过长的错误响应体
fn truncate_body(body: String) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body;
    }
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push('…');
    truncated
}

/// 解析补全响应
fn parse_completion(body: &str) -> Result<GeneratedJoke, GenerationError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::MalformedResponse("missing choices[0].message.content".to_string()))?;

    let text = clean_joke_text(&content);
    if text.is_empty() {
        return Err(GenerationError::EmptyCompletion);
    }

    Ok(GeneratedJoke {
        text,
        tokens_used: response.usage.map(|u| u.total_tokens).unwrap_or(0),
    })
}

/// 将 HTTP 状态码映射为生成错误
fn status_error(status: StatusCode, body: String) -> GenerationError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        GenerationError::RateLimited
    } else {
        GenerationError::Api {
            status: status.as_u16(),
            body: truncate_body(body),
        }
    }
}

/// OpenRouter 客户端
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterClientConfig,
    /// 上一次请求的开始时间；持有锁期间即为“请求在途”
    last_request: Mutex<Option<Instant>>,
}

impl OpenRouterClient {
    /// 创建新的 OpenRouter 客户端
    pub fn new(config: OpenRouterClientConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            last_request: Mutex::new(None),
        })
    }

    /// 模型列表 URL（用于健康检查）
    fn models_url(&self) -> Option<String> {
        self.config
            .api_url
            .strip_suffix("/chat/completions")
            .map(|base| format!("{}/models", base))
    }

    async fn send_completion(&self, theme: &str) -> Result<GeneratedJoke, GenerationError> {
        let prompt = user_prompt(theme);
        let request = CompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        tracing::debug!(
            url = %self.config.api_url,
            model = %self.config.model,
            theme = %theme,
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else if e.is_connect() {
                    GenerationError::Network(format!("Cannot connect to completion service: {}", e))
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "Completion response received");

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_text));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::MalformedResponse(format!("Failed to read body: {}", e))
            }
        })?;

        parse_completion(&body)
    }
}

#[async_trait]
impl JokeGeneratorPort for OpenRouterClient {
    async fn generate(&self, theme: &str) -> Result<GeneratedJoke, GenerationError> {
        let mut last_request = self.last_request.lock().await;

        if let Some(wait) = cooldown_remaining(*last_request, Instant::now(), self.config.cooldown) {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Waiting for request cooldown");
            tokio::time::sleep(wait).await;
        }
        *last_request = Some(Instant::now());

        let result = self.send_completion(theme).await;

        match &result {
            Ok(joke) => tracing::info!(
                theme = %theme,
                tokens_used = joke.tokens_used,
                chars = joke.text.chars().count(),
                "Joke generated"
            ),
            Err(err) => tracing::warn!(theme = %theme, error = %err, "Completion request failed"),
        }

        result
    }

    async fn health_check(&self) -> bool {
        let Some(url) = self.models_url() else {
            return true;
        };

        match self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = OpenRouterClientConfig::default();
        assert_eq!(config.model, "deepseek/deepseek-chat");
        assert_eq!(config.max_tokens, 250);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.cooldown, Duration::from_secs(5));
    }

    #[test]
    fn test_config_builder() {
        let config = OpenRouterClientConfig::new("key")
            .with_timeout(10)
            .with_cooldown(Duration::from_secs(1));
        assert_eq!(config.api_key, "key");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.cooldown, Duration::from_secs(1));
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 250,
            temperature: 0.5,
            top_p: 0.9,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["max_tokens"], 250);
        assert_eq!(json["temperature"], 0.5);
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "  Шутка   про кота.  "}}],
            "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
        }"#;
        let joke = parse_completion(body).unwrap();
        assert_eq!(joke.text, "Шутка про кота.");
        assert_eq!(joke.tokens_used, 120);
    }

    #[test]
    fn test_parse_completion_without_usage() {
        let body = r#"{"choices": [{"message": {"content": "Шутка."}}]}"#;
        assert_eq!(parse_completion(body).unwrap().tokens_used, 0);
    }

    #[test]
    fn test_parse_completion_errors() {
        assert!(matches!(
            parse_completion("not json"),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices": [{"message": {"content": " \n "}}]}"#),
            Err(GenerationError::EmptyCompletion)
        ));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            GenerationError::RateLimited
        ));
        match status_error(StatusCode::UNAUTHORIZED, "x".repeat(1000)) {
            GenerationError::Api { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_cooldown_remaining() {
        let cooldown = Duration::from_secs(5);
        let start = Instant::now();

        assert_eq!(cooldown_remaining(None, start, cooldown), None);
        assert_eq!(
            cooldown_remaining(Some(start), start + Duration::from_secs(2), cooldown),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            cooldown_remaining(Some(start), start + Duration::from_secs(5), cooldown),
            None
        );
        assert_eq!(
            cooldown_remaining(Some(start), start + Duration::from_secs(9), cooldown),
            None
        );
    }

    #[test]
    fn test_models_url() {
        let client = OpenRouterClient::new(OpenRouterClientConfig::default()).unwrap();
        assert_eq!(
            client.models_url().as_deref(),
            Some("https://openrouter.ai/api/v1/models")
        );

        let mut config = OpenRouterClientConfig::default();
        config.api_url = "http://localhost:9000/generate".to_string();
        let client = OpenRouterClient::new(config).unwrap();
        assert_eq!(client.models_url(), None);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let mut config = OpenRouterClientConfig::new("key")
            .with_timeout(2)
            .with_cooldown(Duration::ZERO);
        config.api_url = "http://127.0.0.1:1/api/v1/chat/completions".to_string();
        let client = OpenRouterClient::new(config).unwrap();

        let err = client.generate("кошки").await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Network(_) | GenerationError::Timeout
        ));
    }

    // ------------------------------------------------------------------
    // 本地 HTTP 桩服务
    // ------------------------------------------------------------------

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// 桩服务收到的一次请求
    #[derive(Debug, Clone)]
    struct ReceivedRequest {
        started: Instant,
        finished: Instant,
        /// 请求行与头部（已转小写）
        head: String,
        body: String,
    }

    #[derive(Default)]
    struct StubState {
        received: std::sync::Mutex<Vec<ReceivedRequest>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        next_response: AtomicUsize,
    }

    struct StubServer {
        url: String,
        state: Arc<StubState>,
    }

    impl StubServer {
        /// 按到达时间排序的请求
        fn received(&self) -> Vec<ReceivedRequest> {
            let mut received = self.state.received.lock().unwrap().clone();
            received.sort_by_key(|r| r.started);
            received
        }

        fn max_in_flight(&self) -> usize {
            self.state.max_in_flight.load(Ordering::SeqCst)
        }
    }

    /// 启动桩服务：按到达顺序依次返回 `responses`，每个请求处理耗时 `latency`
    async fn start_stub(responses: Vec<(u16, String)>, latency: Duration) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(StubState::default());
        let responses = Arc::new(responses);

        let server_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve_one(
                    stream,
                    server_state.clone(),
                    responses.clone(),
                    latency,
                ));
            }
        });

        StubServer {
            url: format!("http://{}/api/v1/chat/completions", addr),
            state,
        }
    }

    async fn serve_one(
        mut stream: TcpStream,
        state: Arc<StubState>,
        responses: Arc<Vec<(u16, String)>>,
        latency: Duration,
    ) {
        let now_in_flight = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        let started = Instant::now();

        let (head, body) = read_request(&mut stream).await;
        tokio::time::sleep(latency).await;

        let index = state.next_response.fetch_add(1, Ordering::SeqCst);
        let (status, payload) = responses
            .get(index)
            .cloned()
            .unwrap_or((500, "no response configured".to_string()));

        state.received.lock().unwrap().push(ReceivedRequest {
            started,
            finished: Instant::now(),
            head,
            body,
        });
        state.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            payload.len(),
            payload
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    /// 读取完整的 HTTP 请求，返回（小写头部, 请求体）
    async fn read_request(stream: &mut TcpStream) -> (String, String) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }

        let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();
        (head, body)
    }

    fn completion_body(content: &str, total_tokens: i64) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"total_tokens": total_tokens}
        })
        .to_string()
    }

    fn stub_client(url: &str, cooldown: Duration) -> Arc<OpenRouterClient> {
        let mut config = OpenRouterClientConfig::new("test-key")
            .with_timeout(10)
            .with_cooldown(cooldown);
        config.api_url = url.to_string();
        Arc::new(OpenRouterClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_generate_sends_headers_and_parses_reply() {
        let stub = start_stub(
            vec![(200, completion_body("  Шутка   про кота. ", 77))],
            Duration::ZERO,
        )
        .await;
        let client = stub_client(&stub.url, Duration::ZERO);

        let joke = client.generate("кот").await.unwrap();
        assert_eq!(joke.text, "Шутка про кота.");
        assert_eq!(joke.tokens_used, 77);

        let received = stub.received();
        assert_eq!(received.len(), 1);
        let head = &received[0].head;
        assert!(head.starts_with("post /api/v1/chat/completions "));
        assert!(head.contains("authorization: bearer test-key"));
        assert!(head.contains("http-referer: https://t.me/anekdotych_bot"));
        assert!(head.contains("x-title: anekdotych telegram bot"));
        assert!(head.contains("content-type: application/json"));

        let body: serde_json::Value = serde_json::from_str(&received[0].body).unwrap();
        assert_eq!(body["model"], "deepseek/deepseek-chat");
        assert_eq!(body["max_tokens"], 250);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("кот"));
    }

    #[tokio::test]
    async fn test_error_statuses_are_typed() {
        let stub = start_stub(
            vec![
                (429, r#"{"error": "rate limited"}"#.to_string()),
                (500, r#"{"error": "boom"}"#.to_string()),
            ],
            Duration::ZERO,
        )
        .await;
        let client = stub_client(&stub.url, Duration::ZERO);

        let first = client.generate("кот").await.unwrap_err();
        assert!(matches!(first, GenerationError::RateLimited));

        match client.generate("кот").await.unwrap_err() {
            GenerationError::Api { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_overlap() {
        // 服务端耗时长于冷却时间：只有持锁跨越整个请求才能避免重叠
        let latency = Duration::from_millis(300);
        let cooldown = Duration::from_millis(100);
        let stub = start_stub(
            vec![
                (200, completion_body("Первая шутка.", 1)),
                (200, completion_body("Вторая шутка.", 2)),
            ],
            latency,
        )
        .await;
        let client = stub_client(&stub.url, cooldown);

        let (a, b) = tokio::join!(
            {
                let client = client.clone();
                async move { client.generate("кот").await }
            },
            {
                let client = client.clone();
                async move { client.generate("собака").await }
            }
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        let received = stub.received();
        assert_eq!(received.len(), 2);
        assert_eq!(stub.max_in_flight(), 1);
        assert!(received[1].started >= received[0].finished);
        assert!(received[1].started - received[0].started >= cooldown);
    }

    #[tokio::test]
    async fn test_second_request_waits_for_cooldown() {
        let cooldown = Duration::from_millis(400);
        let stub = start_stub(
            vec![
                (200, completion_body("Первая шутка.", 1)),
                (200, completion_body("Вторая шутка.", 2)),
            ],
            Duration::from_millis(10),
        )
        .await;
        let client = stub_client(&stub.url, cooldown);

        let (a, b) = tokio::join!(
            {
                let client = client.clone();
                async move { client.generate("кот").await }
            },
            {
                let client = client.clone();
                async move { client.generate("собака").await }
            }
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        let received = stub.received();
        assert_eq!(received.len(), 2);
        assert_eq!(stub.max_in_flight(), 1);
        // 客户端在发出请求前记录开始时间，服务端计时允许少量网络抖动
        let gap = received[1].started - received[0].started;
        assert!(
            gap >= cooldown - Duration::from_millis(50),
            "requests only {:?} apart",
            gap
        );
    }
}
