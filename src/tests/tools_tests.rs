//! Tool call tests
//!
//! `tools/call` end to end through the dispatcher, against temp projects.

#[cfg(test)]
use {
    super::{handler, write_go_file, RecordingGenerator, GREETER_SOURCE},
    crate::config::CONFIG_FILE_NAME,
    crate::error::codes,
    crate::protocol_impl::McpProtocolHandlerImpl,
    crate::protocol_testable::McpProtocolHandler,
    serde_json::{json, Value},
    std::sync::Arc,
    tempfile::TempDir,
};

#[cfg(test)]
async fn call(handler: &McpProtocolHandlerImpl, name: &str, arguments: Value) -> Value {
    handler
        .handle_message(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }))
        .await
        .expect("requests with an id always get a response")
}

#[tokio::test]
async fn test_unknown_tool_is_method_not_found() {
    let response = call(&handler(), "echo", json!({"message": "hi"})).await;

    assert!(response.get("result").is_none());
    assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);
    assert!(response["error"]["message"].as_str().unwrap().contains("echo"));
}

#[tokio::test]
async fn test_discover_greeter_project() {
    let temp = TempDir::new().unwrap();
    write_go_file(temp.path(), "greeter.go", GREETER_SOURCE);

    let response = call(
        &handler(),
        "discover_interfaces",
        json!({"project_path": temp.path()}),
    )
    .await;

    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with(&format!("Found 1 interfaces in {}:", temp.path().display())));
    assert!(text.contains("- Greeter (demo package) - 1 methods"));
    assert!(text.contains("greeter.go"));
    assert_eq!(result["isError"], false);

    let greeter = &result["data"]["interfaces"][0];
    assert_eq!(result["data"]["count"], 1);
    assert_eq!(greeter["name"], "Greeter");
    assert_eq!(greeter["package"], "demo");
    assert_eq!(greeter["line_number"], 3);
    assert_eq!(greeter["methods"][0]["name"], "Greet");
    assert_eq!(
        greeter["methods"][0]["parameters"],
        json!([{"name": "name", "type": "string"}])
    );
    assert_eq!(
        greeter["methods"][0]["returns"],
        json!([{"type": "string"}, {"type": "error"}])
    );
}

#[tokio::test]
async fn test_discover_applies_patterns() {
    let temp = TempDir::new().unwrap();
    write_go_file(
        temp.path(),
        "api/store.go",
        "package api\n\ntype Store interface {\n\tGet(key string) ([]byte, error)\n}\n",
    );
    write_go_file(
        temp.path(),
        "internal/cache.go",
        "package internal\n\ntype Cache interface {\n\tFlush()\n}\n",
    );

    let response = call(
        &handler(),
        "discover_interfaces",
        json!({"project_path": temp.path(), "exclude_patterns": ["internal/**"]}),
    )
    .await;

    assert_eq!(response["result"]["data"]["count"], 1);
    assert_eq!(response["result"]["data"]["interfaces"][0]["name"], "Store");
}

#[tokio::test]
async fn test_discover_argument_errors() {
    let handler = handler();

    let missing = call(&handler, "discover_interfaces", json!({})).await;
    assert_eq!(missing["error"]["code"], codes::INVALID_PARAMS);

    let wrong_type = call(&handler, "discover_interfaces", json!({"project_path": 42})).await;
    assert_eq!(wrong_type["error"]["code"], codes::INVALID_PARAMS);

    let empty = call(&handler, "discover_interfaces", json!({"project_path": "  "})).await;
    assert_eq!(empty["error"]["code"], codes::INVALID_PARAMS);

    let temp = TempDir::new().unwrap();
    let bad_pattern = call(
        &handler,
        "discover_interfaces",
        json!({"project_path": temp.path(), "include_patterns": ["src/[unclosed"]}),
    )
    .await;
    assert_eq!(bad_pattern["error"]["code"], codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_discover_missing_project_is_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let response = call(
        &handler(),
        "discover_interfaces",
        json!({"project_path": missing}),
    )
    .await;

    assert_eq!(response["error"]["code"], codes::NOT_FOUND);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Project path does not exist"));
}

#[tokio::test]
async fn test_generate_without_mockery_is_dependency_error() {
    let temp = TempDir::new().unwrap();
    write_go_file(temp.path(), "greeter.go", GREETER_SOURCE);

    let response = call(
        &handler(),
        "generate_mock",
        json!({"interface_name": "Greeter", "package_path": temp.path()}),
    )
    .await;

    assert!(response.get("result").is_none());
    assert_eq!(response["error"]["code"], codes::DEPENDENCY_UNAVAILABLE);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("go install github.com/vektra/mockery/v2@latest"));
    assert_eq!(response["error"]["data"]["command"], super::MISSING_MOCKERY);
    assert!(!temp.path().join("mocks").exists());
}

#[tokio::test]
async fn test_generate_requires_names() {
    let handler = handler();

    let missing = call(&handler, "generate_mock", json!({"package_path": "."})).await;
    assert_eq!(missing["error"]["code"], codes::INVALID_PARAMS);

    let empty = call(
        &handler,
        "generate_mock",
        json!({"interface_name": "", "package_path": "."}),
    )
    .await;
    assert_eq!(empty["error"]["code"], codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_generate_passes_request_to_generator() {
    let generator = Arc::new(RecordingGenerator::default());
    let handler = McpProtocolHandlerImpl::with_generator(generator.clone());

    let response = call(
        &handler,
        "generate_mock",
        json!({
            "interface_name": "UserRepository",
            "package_path": "./internal/domain",
            "filename_format": "mock_{{.InterfaceName}}.go"
        }),
    )
    .await;

    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Mock generated successfully:"));
    assert!(text.contains("- Interface: UserRepository"));
    assert!(text.contains("- Package: ./internal/domain"));
    assert!(text.contains("mock_UserRepository.go"));
    assert_eq!(response["result"]["data"]["success"], true);

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].with_expecter);
    assert_eq!(requests[0].output_dir, None);
}

#[cfg(unix)]
#[tokio::test]
async fn test_generate_greeter_with_fake_mockery() {
    use crate::generator::MockeryInvoker;

    let temp = TempDir::new().unwrap();
    let tool = super::fake_mockery(temp.path(), 0);
    let package = temp.path().join("demo");
    write_go_file(&package, "greeter.go", GREETER_SOURCE);

    let handler = McpProtocolHandlerImpl::with_generator(Arc::new(MockeryInvoker::new(
        tool.to_str().unwrap(),
    )));
    let response = call(
        &handler,
        "generate_mock",
        json!({
            "interface_name": "Greeter",
            "package_path": package,
            "filename_format": "mock_{{.InterfaceName}}.go"
        }),
    )
    .await;

    let data = &response["result"]["data"];
    assert_eq!(data["success"], true);
    let generated = data["generated_file"].as_str().unwrap();
    assert!(generated.ends_with("mock_Greeter.go"));
    assert!(std::path::Path::new(generated).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_generate_tool_failure_carries_output() {
    use crate::generator::MockeryInvoker;

    let temp = TempDir::new().unwrap();
    let tool = super::fake_mockery(temp.path(), 1);

    let handler = McpProtocolHandlerImpl::with_generator(Arc::new(MockeryInvoker::new(
        tool.to_str().unwrap(),
    )));
    let response = call(
        &handler,
        "generate_mock",
        json!({"interface_name": "Greeter", "package_path": temp.path()}),
    )
    .await;

    assert_eq!(response["error"]["code"], codes::INTERNAL_ERROR);
    let output = response["error"]["data"]["output"].as_str().unwrap();
    assert!(output.contains("--name=Greeter"));
    assert!(output.contains("fake failure"));
}

#[tokio::test]
async fn test_update_config_writes_defaults_and_interfaces() {
    let temp = TempDir::new().unwrap();

    let response = call(
        &handler(),
        "update_mockery_config",
        json!({
            "project_path": temp.path(),
            "interfaces": {
                "github.com/example/project/internal/domain": {
                    "UserRepository": {"dir": "./internal/domain"}
                }
            }
        }),
    )
    .await;

    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Mockery configuration updated successfully"));

    let yaml = std::fs::read_to_string(temp.path().join(CONFIG_FILE_NAME)).unwrap();
    assert!(yaml.contains("with-expecter: true"));
    assert!(yaml.contains("outpkg: mocks"));
    assert!(yaml.contains("UserRepository"));
    assert_eq!(response["result"]["data"]["config"]["outpkg"], "mocks");
}

#[tokio::test]
async fn test_update_config_merges_with_existing_file() {
    let temp = TempDir::new().unwrap();
    let handler = handler();

    call(
        &handler,
        "update_mockery_config",
        json!({
            "project_path": temp.path(),
            "interfaces": {"pkgX": {"X": {"dir": "./x"}}}
        }),
    )
    .await;

    let response = call(
        &handler,
        "update_mockery_config",
        json!({
            "project_path": temp.path(),
            "interfaces": {"pkgY": {"Y": {"dir": "./y", "filename": "y_mock.go"}}},
            "global_config": {"filename": "override_{{.InterfaceName}}.go", "with_expecter": false}
        }),
    )
    .await;

    let config = &response["result"]["data"]["config"];
    assert_eq!(config["filename"], "override_{{.InterfaceName}}.go");
    assert_eq!(config["outpkg"], "mocks");
    assert_eq!(config["with-expecter"], false);
    assert!(config["packages"]["pkgX"].is_object());
    assert_eq!(
        config["packages"]["pkgY"]["interfaces"]["Y"]["config"]["filename"],
        "y_mock.go"
    );
}

#[tokio::test]
async fn test_update_config_rejects_invalid_without_writing() {
    let temp = TempDir::new().unwrap();
    let handler = handler();

    let missing_dir = call(
        &handler,
        "update_mockery_config",
        json!({
            "project_path": temp.path(),
            "interfaces": {"pkg": {"Repo": {"filename": "repo.go"}}}
        }),
    )
    .await;
    assert_eq!(missing_dir["error"]["code"], codes::INVALID_PARAMS);
    assert!(missing_dir["error"]["message"]
        .as_str()
        .unwrap()
        .contains("directory is required for interface Repo in package pkg"));

    let empty_package = call(
        &handler,
        "update_mockery_config",
        json!({"project_path": temp.path(), "interfaces": {"pkg": {}}}),
    )
    .await;
    assert_eq!(empty_package["error"]["code"], codes::INVALID_PARAMS);

    assert!(!temp.path().join(CONFIG_FILE_NAME).exists());
}

#[tokio::test]
async fn test_update_config_missing_project_is_not_found() {
    let temp = TempDir::new().unwrap();

    let response = call(
        &handler(),
        "update_mockery_config",
        json!({"project_path": temp.path().join("missing")}),
    )
    .await;

    assert_eq!(response["error"]["code"], codes::NOT_FOUND);
}
