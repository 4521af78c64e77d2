use std::{
	collections::HashMap,
	future::IntoFuture,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing,
};
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use chatlog_backend::{EsClient, Error};
use chatlog_domain::{
	partition::TimeRange,
	query::{IdentityFilter, QueryBuilder, QuerySpec},
};

#[derive(Clone, Default)]
struct StubEs {
	search_calls: Arc<AtomicUsize>,
	failures_before_success: usize,
	requests: Arc<Mutex<Vec<RecordedSearch>>>,
}

#[derive(Clone, Debug)]
struct RecordedSearch {
	path: String,
	pretty: bool,
	source_header: Option<String>,
	body: Value,
}

async fn start_stub(stub: StubEs) -> (String, Sender<()>) {
	let app = Router::new()
		.route("/{index}", routing::head(index_handler))
		.route("/{index}/_search", routing::post(search_handler))
		.route("/{index}/{doc_type}/_search", routing::post(typed_search_handler))
		.with_state(stub);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind stub backend.");
	let addr = listener.local_addr().expect("Failed to read stub backend address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

async fn index_handler(Path(index): Path<String>) -> StatusCode {
	if index.starts_with("chat_") { StatusCode::OK } else { StatusCode::NOT_FOUND }
}

async fn search_handler(
	State(stub): State<StubEs>,
	Path(index): Path<String>,
	Query(params): Query<HashMap<String, String>>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Response {
	record_search(stub, format!("/{index}/_search"), params, headers, body)
}

async fn typed_search_handler(
	State(stub): State<StubEs>,
	Path((index, doc_type)): Path<(String, String)>,
	Query(params): Query<HashMap<String, String>>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Response {
	record_search(stub, format!("/{index}/{doc_type}/_search"), params, headers, body)
}

fn record_search(
	stub: StubEs,
	path: String,
	params: HashMap<String, String>,
	headers: HeaderMap,
	body: Value,
) -> Response {
	let call_index = stub.search_calls.fetch_add(1, Ordering::SeqCst);

	if call_index < stub.failures_before_success {
		return StatusCode::SERVICE_UNAVAILABLE.into_response();
	}

	let source_header = headers
		.get("x-request-source")
		.and_then(|value| value.to_str().ok())
		.map(ToString::to_string);

	stub.requests.lock().unwrap_or_else(|err| err.into_inner()).push(RecordedSearch {
		path,
		pretty: params.get("pretty").map(|value| value == "true").unwrap_or(false),
		source_header,
		body,
	});

	(
		StatusCode::OK,
		Json(serde_json::json!({
			"took": 1,
			"hits": {
				"total": { "value": 2, "relation": "eq" },
				"hits": [
					{ "_id": "1", "_source": { "uuid": "m-1", "from_id": 100 } },
					{ "_id": "2", "_source": { "uuid": "m-2", "from_id": 231 } }
				]
			}
		})),
	)
		.into_response()
}

fn backend_config(url: String) -> chatlog_config::Backend {
	let mut default_headers = Map::new();

	default_headers.insert("x-request-source".to_string(), Value::String("chatlog".to_string()));

	chatlog_config::Backend {
		url,
		index: "chat_{year}".to_string(),
		doc_type: None,
		timeout_ms: 2_000,
		max_retries: 0,
		retry_backoff_ms: 10,
		pretty: false,
		default_headers,
	}
}

fn sample_spec() -> QuerySpec {
	QueryBuilder::new(
		IdentityFilter { from_id: 100, to_id: 231, user_id: 0 },
		TimeRange { begin: 1_580_046_211_000, end: 1_584_546_239_000 },
	)
	.limit(100)
	.build()
}

#[tokio::test]
async fn probes_index_existence() {
	let (url, shutdown) = start_stub(StubEs::default()).await;
	let client = EsClient::new(&backend_config(url)).expect("Failed to build client.");

	assert!(client.index_exists("chat_2020").await.expect("Probe failed."));
	assert!(!client.index_exists("other_2020").await.expect("Probe failed."));

	let _ = shutdown.send(());
}

#[tokio::test]
async fn search_posts_body_and_parses_hits() {
	let stub = StubEs::default();
	let requests = stub.requests.clone();
	let (url, shutdown) = start_stub(stub).await;
	let client = EsClient::new(&backend_config(url)).expect("Failed to build client.");
	let page = client.search("chat_2020", &sample_spec()).await.expect("Search failed.");

	assert_eq!(page.total, 2);
	assert_eq!(page.hits.len(), 2);
	assert_eq!(page.hits[0]["uuid"], "m-1");

	let recorded = requests.lock().unwrap_or_else(|err| err.into_inner()).clone();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].path, "/chat_2020/_search");
	assert!(!recorded[0].pretty);
	assert_eq!(recorded[0].source_header.as_deref(), Some("chatlog"));
	assert_eq!(recorded[0].body["size"], 100);
	assert!(recorded[0].body.get("from").is_none());

	let _ = shutdown.send(());
}

#[tokio::test]
async fn doc_type_and_pretty_shape_the_request() {
	let stub = StubEs::default();
	let requests = stub.requests.clone();
	let (url, shutdown) = start_stub(stub).await;
	let mut cfg = backend_config(url);

	cfg.doc_type = Some("message".to_string());
	cfg.pretty = true;

	let client = EsClient::new(&cfg).expect("Failed to build client.");

	client.search("chat_2020", &sample_spec()).await.expect("Search failed.");

	let recorded = requests.lock().unwrap_or_else(|err| err.into_inner()).clone();

	assert_eq!(recorded[0].path, "/chat_2020/message/_search");
	assert!(recorded[0].pretty);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn server_errors_are_retried() {
	let stub = StubEs { failures_before_success: 2, ..Default::default() };
	let calls = stub.search_calls.clone();
	let (url, shutdown) = start_stub(stub).await;
	let mut cfg = backend_config(url);

	cfg.max_retries = 2;

	let client = EsClient::new(&cfg).expect("Failed to build client.");
	let page = client.search("chat_2020", &sample_spec()).await.expect("Search failed.");

	assert_eq!(page.total, 2);
	assert_eq!(calls.load(Ordering::SeqCst), 3);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn exhausted_retries_surface_the_status() {
	let stub = StubEs { failures_before_success: 5, ..Default::default() };
	let calls = stub.search_calls.clone();
	let (url, shutdown) = start_stub(stub).await;
	let mut cfg = backend_config(url);

	cfg.max_retries = 1;

	let client = EsClient::new(&cfg).expect("Failed to build client.");
	let err = client.search("chat_2020", &sample_spec()).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Status { status: 503, .. }), "Unexpected error: {err}");
	assert_eq!(calls.load(Ordering::SeqCst), 2);

	let _ = shutdown.send(());
}

#[test]
fn rejects_non_string_default_headers() {
	let mut headers = Map::new();

	headers.insert("x-retries".to_string(), Value::from(3));

	assert!(chatlog_backend::default_headers(&headers).is_err());
}
