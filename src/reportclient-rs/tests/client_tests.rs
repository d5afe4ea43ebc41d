use percent_encoding::percent_decode_str;
use reportclient_rs::{
    keys, Action, ClientConfig, ClientError, ExportFormat, ImportErrorPolicy, ImportOperation,
    ImportType, Params, ProxyConfig, ProxyKind, ReportClient,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the fake service saw
struct Captured {
    request_line: String,
    body: String,
}

impl Captured {
    /// Form body decoded into ordered pairs
    fn form(&self) -> Vec<(String, String)> {
        self.body
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(k), decode(v))
            })
            .collect()
    }

    fn form_value(&self, key: &str) -> Option<String> {
        self.form().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

fn decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Accept one connection, record the request, answer with `status` and `body`
async fn serve_once(status: u16, body: impl Into<Vec<u8>>) -> (String, JoinHandle<Captured>) {
    let response_body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
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

        let headers = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let content_length = headers
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let reason = if status == 200 { "OK" } else { "Error" };
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            reason,
            response_body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(&response_body).await.unwrap();
        stream.shutdown().await.ok();

        Captured {
            request_line: headers.lines().next().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(&buf[header_end..]).into_owned(),
        }
    });

    (format!("http://{}/api/", addr), handle)
}

fn client_for(base_url: &str) -> ReportClient {
    ReportClient::from_config(ClientConfig {
        base_url: base_url.to_string(),
        ..ClientConfig::new("test-token")
    })
    .unwrap()
}

#[tokio::test]
async fn test_add_row_zips_columns_with_values() {
    let (base, server) = serve_once(
        200,
        json!({"response": {"result": {"column_order": ["a", "b"], "rows": [[1, 2]]}}}).to_string(),
    )
    .await;
    let client = client_for(&base);
    let uri = client.table_uri("owner@example.com", "Sales DB", "Orders");

    let columns = Params::new().with("a", "1").with("b", "2");
    let row = client.add_row(&uri, &columns, None).await.unwrap();

    assert_eq!(serde_json::Value::Object(row), json!({"a": 1, "b": 2}));

    let captured = server.await.unwrap();
    assert!(captured.request_line.starts_with("POST /api/owner%40example.com/Sales%20DB/Orders?"));
    assert!(captured.request_line.contains("ZOHO_ACTION=ADDROW"));
    assert!(captured.request_line.contains("ZOHO_OUTPUT_FORMAT=JSON"));
    assert!(captured.request_line.contains("ZOHO_ERROR_FORMAT=JSON"));
    assert!(captured.request_line.contains("authtoken=test-token"));
    assert!(captured.request_line.contains("ZOHO_API_VERSION=1.0"));
    assert_eq!(captured.form_value("a").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_export_returns_raw_body() {
    let csv = "Region,Sales\nEast,\"1,200\"\n{not json";
    let (base, server) = serve_once(200, csv).await;
    let client = client_for(&base);
    let uri = client.table_uri("owner@example.com", "Sales", "Orders");

    let bytes = client
        .export_data(&uri, ExportFormat::Csv, Some("\"Region\"='East'"), None)
        .await
        .unwrap();
    assert_eq!(bytes, csv.as_bytes());

    let captured = server.await.unwrap();
    assert!(captured.request_line.contains("ZOHO_ACTION=EXPORT"));
    assert!(captured.request_line.contains("ZOHO_OUTPUT_FORMAT=CSV"));
    assert_eq!(captured.form_value(keys::CRITERIA).as_deref(), Some("\"Region\"='East'"));
}

#[tokio::test]
async fn test_server_error_envelope() {
    let (base, _server) = serve_once(
        400,
        r#"{"response":{"error":{"code":8061,"message":"Invalid ticket"}}}"#,
    )
    .await;
    let client = client_for(&base);
    let uri = client.user_uri("owner@example.com");

    let err = client.get_users(&uri, None).await.unwrap_err();
    match err {
        ClientError::Server { code, message, action, status } => {
            assert_eq!(code, 8061);
            assert_eq!(message, "Invalid ticket");
            assert_eq!(action, Action::GetUsers);
            assert_eq!(status, 400);
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_export_error_is_still_decoded() {
    let (base, _server) = serve_once(
        404,
        r#"{"response":{"error":{"code":7103,"message":"View not found"}}}"#,
    )
    .await;
    let client = client_for(&base);
    let uri = client.table_uri("owner@example.com", "Sales", "Missing");

    let err = client
        .export_data(&uri, ExportFormat::Json, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(7103));
    assert_eq!(err.action(), Some(Action::Export));
}

#[tokio::test]
async fn test_import_as_string_keeps_empty_data() {
    let (base, server) = serve_once(
        200,
        json!({"response": {"result": {
            "importSummary": {
                "importType": "APPEND",
                "totalColumnCount": 2,
                "selectedColumnCount": 2,
                "totalRowCount": 0,
                "successRowCount": 0,
                "warnings": 0,
                "importOperation": "created"
            },
            "importErrors": "",
            "columnDetails": {"Region": "Plain Text"}
        }}})
        .to_string(),
    )
    .await;
    let client = client_for(&base);
    let uri = client.table_uri("owner@example.com", "Sales", "Orders");

    let config = Params::new().with("ZOHO_DATE_FORMAT", "");
    let result = client
        .import_data_as_string(
            &uri,
            ImportType::Append,
            "",
            true,
            ImportErrorPolicy::SkipRow,
            Some(&config),
        )
        .await
        .unwrap();

    assert_eq!(result.import_operation(), ImportOperation::Created);
    assert_eq!(result.column_data_type("Region"), Some("Plain Text"));

    let captured = server.await.unwrap();
    assert!(captured.request_line.contains("ZOHO_ACTION=IMPORT"));
    assert_eq!(captured.form_value(keys::IMPORT_DATA).as_deref(), Some(""));
    assert_eq!(captured.form_value(keys::IMPORT_TYPE).as_deref(), Some("APPEND"));
    assert_eq!(captured.form_value(keys::ON_IMPORT_ERROR).as_deref(), Some("SKIPROW"));
    assert_eq!(captured.form_value(keys::AUTO_IDENTIFY).as_deref(), Some("true"));
    assert_eq!(captured.form_value(keys::CREATE_TABLE).as_deref(), Some("false"));
    assert!(captured.form_value("ZOHO_DATE_FORMAT").is_none());
}

#[tokio::test]
async fn test_empty_params_dropped_and_caller_criteria_kept() {
    let (base, server) = serve_once(200, "").await;
    let client = client_for(&base);
    let uri = client.table_uri("owner@example.com", "Sales", "Orders");

    let config = Params::new()
        .with(keys::CRITERIA, "\"Year\"=2024")
        .with("ZOHO_EXTRA", "");
    client.delete_data(&uri, None, Some(&config)).await.unwrap();

    let captured = server.await.unwrap();
    let form = captured.form();
    assert_eq!(form, vec![(keys::CRITERIA.to_string(), "\"Year\"=2024".to_string())]);
}

#[tokio::test]
async fn test_hide_column_sends_repeated_url_parameters() {
    let (base, server) = serve_once(200, r#"{"response":{"result":{"message":"ok"}}}"#).await;
    let client = client_for(&base);
    let uri = client.table_uri("owner@example.com", "Sales", "Orders");

    let result = client
        .hide_column(&uri, &["Region", "Unit Cost"], None)
        .await
        .unwrap();
    assert_eq!(result, json!({"message": "ok"}));

    let captured = server.await.unwrap();
    assert!(captured
        .request_line
        .contains("&ZOHO_COLUMNNAME=Region&ZOHO_COLUMNNAME=Unit%20Cost"));
    assert!(captured.form_value(keys::COLUMN_NAME).is_none());
}

#[tokio::test]
async fn test_double_escaped_response_is_decoded() {
    let (base, _server) =
        serve_once(200, r#"{\"response\":{\"result\":{\"isdbexist\":\"true\"}}}"#).await;
    let client = client_for(&base);
    let uri = client.user_uri("owner@example.com");

    assert!(client.is_db_exist(&uri, "Sales", None).await.unwrap());
}

#[tokio::test]
async fn test_unparseable_success_body() {
    let (base, _server) = serve_once(200, "<html>maintenance</html>").await;
    let client = client_for(&base);
    let uri = client.db_uri("owner@example.com", "Sales");

    let err = client.get_copy_db_key(&uri, None).await.unwrap_err();
    assert!(matches!(err, ClientError::Parse { action: Action::GetCopyDbKey }));
}

#[tokio::test]
async fn test_plan_info_without_trial() {
    let (base, _server) = serve_once(
        200,
        json!({"response": {"result": {
            "plan": "Standard",
            "addon": "",
            "billingDate": "01 Dec, 2026",
            "rowsAllowed": 500000,
            "rowsUsed": "1200",
            "TrialAvailed": "false"
        }}})
        .to_string(),
    )
    .await;
    let client = client_for(&base);
    let uri = client.user_uri("owner@example.com");

    let plan = client.get_plan_info(&uri, None).await.unwrap();
    assert_eq!(plan.plan(), "Standard");
    assert_eq!(plan.rows_used(), 1200);
    assert!(!plan.is_trial_availed());
    assert!(plan.trial_status().is_none());
}

#[tokio::test]
async fn test_copy_database_numeric_id() {
    let (base, server) =
        serve_once(200, r#"{"response":{"result":{"dbid":1148746000000012345}}}"#).await;
    let client = client_for(&base);
    let uri = client.db_uri("owner@example.com", "Sales/2024");

    let id = client
        .copy_database(&uri, "key-abc", "Sales Copy", None)
        .await
        .unwrap();
    assert_eq!(id, "1148746000000012345");

    let captured = server.await.unwrap();
    assert!(captured.request_line.contains("/api/owner%40example.com/Sales(/)2024?"));
    assert_eq!(captured.form_value(keys::DATABASE_NAME).as_deref(), Some("Sales Copy"));
    assert_eq!(captured.form_value(keys::COPY_DB_KEY).as_deref(), Some("key-abc"));
}

#[tokio::test]
async fn test_share_view_joins_lists() {
    let (base, server) = serve_once(200, "").await;
    let client = client_for(&base);
    let uri = client.db_uri("owner@example.com", "Sales");

    client
        .share_view(&uri, &["a@example.com", "b@example.com"], &["Orders", "Chart"], None, None)
        .await
        .unwrap();

    let captured = server.await.unwrap();
    assert_eq!(
        captured.form_value(keys::EMAILS).as_deref(),
        Some("a@example.com,b@example.com")
    );
    assert_eq!(captured.form_value(keys::VIEWS).as_deref(), Some("Orders,Chart"));
    assert!(captured.form_value(keys::CRITERIA).is_none());
}

#[tokio::test]
async fn test_share_info_over_the_wire() {
    let (base, _server) = serve_once(
        200,
        json!({"response": {"result": {
            "usershareinfo": [],
            "groupshareinfo": [
                {"shareinfo": {"groupName": "Interns", "desc": "summer", "groupmembers": [],
                    "permissions": [{"perminfo": {"viewname": "Orders", "sharedby": "owner@example.com",
                        "permission": {"read": "true", "export": "false"}}}]}}
            ],
            "publicshareinfo": {},
            "privatelinkshareinfo": {},
            "dbownershareinfo": {"dbowners": []}
        }}})
        .to_string(),
    )
    .await;
    let client = client_for(&base);
    let uri = client.db_uri("owner@example.com", "Sales");

    let info = client.get_share_info(&uri, None).await.unwrap();
    assert_eq!(info.group_members().len(), 1);
    assert!(info.group_members()[0].members.is_empty());
    let perms = &info.group_permissions()["Interns"];
    assert!(perms[0].has_read_permission());
    assert!(!perms[0].has_export_permission());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}/api/", addr));
    let uri = client.user_uri("owner@example.com");

    let err = client.add_user(&uri, &["new@example.com"], None).await.unwrap_err();
    match err {
        ClientError::Transport { action, status, .. } => {
            assert_eq!(action, Action::AddUser);
            assert!(status.is_none());
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_import_missing_file_is_transport_error() {
    let client = client_for("http://127.0.0.1:9/api/");
    let uri = client.table_uri("owner@example.com", "Sales", "Orders");

    let err = client
        .import_data(
            &uri,
            ImportType::UpdateAdd,
            "/definitely/not/here.csv",
            true,
            ImportErrorPolicy::Abort,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport { action: Action::Import, .. }));
}

#[tokio::test]
async fn test_import_file_sends_multipart_body() {
    let dir = std::env::temp_dir().join(format!("reportclient-import-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("orders.csv");
    std::fs::write(&path, "Region,Sales\nEast,100\n").unwrap();

    let (base, server) = serve_once(
        200,
        json!({"response": {"result": {
            "importSummary": {"importType": "APPEND", "successRowCount": 1, "importOperation": "updated"}
        }}})
        .to_string(),
    )
    .await;
    let client = client_for(&base);
    let uri = client.table_uri("owner@example.com", "Sales", "Orders");

    let config = Params::new().with("ZOHO_EMPTY_KEY", "");
    let result = client
        .import_data(&uri, ImportType::Append, &path, true, ImportErrorPolicy::SkipRow, Some(&config))
        .await
        .unwrap();
    assert_eq!(result.success_row_count(), 1);

    let captured = server.await.unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert!(captured.request_line.contains("ZOHO_ACTION=IMPORT"));
    let body = &captured.body;
    assert!(body.contains("name=\"ZOHO_FILE\"; filename=\"orders.csv\""));
    assert!(body.contains("Content-Type: json/csv"));
    assert!(body.contains("Region,Sales\nEast,100\n"));
    assert!(body.contains("name=\"ZOHO_IMPORT_TYPE\"\r\n\r\nAPPEND"));
    assert!(body.contains("name=\"ZOHO_AUTO_IDENTIFY\"\r\n\r\ntrue"));
    assert!(body.contains("name=\"ZOHO_ON_IMPORT_ERROR\"\r\n\r\nSKIPROW"));
    assert!(body.contains("name=\"ZOHO_CREATE_TABLE\"\r\n\r\nfalse"));
    assert!(!body.contains("ZOHO_EMPTY_KEY"));
}

#[tokio::test]
async fn test_requests_go_through_http_proxy() {
    let (proxy_base, server) = serve_once(
        200,
        json!({"response": {"result": {"isdbexist": "true"}}}).to_string(),
    )
    .await;
    let (host, port) = proxy_base
        .trim_start_matches("http://")
        .trim_end_matches("/api/")
        .split_once(':')
        .unwrap();

    let client = ReportClient::from_config(ClientConfig {
        base_url: "http://reports.invalid/api/".to_string(),
        proxy: Some(ProxyConfig {
            host: host.to_string(),
            port: port.parse().unwrap(),
            kind: ProxyKind::Http,
            username: None,
            password: None,
        }),
        ..ClientConfig::new("test-token")
    })
    .unwrap();
    let uri = client.user_uri("owner@example.com");

    assert!(client.is_db_exist(&uri, "Sales", None).await.unwrap());

    let captured = server.await.unwrap();
    assert!(captured
        .request_line
        .starts_with("POST http://reports.invalid/api/owner%40example.com?ZOHO_ACTION=ISDBEXIST"));
}
