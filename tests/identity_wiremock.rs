use docker_credential_acr::identity::{
    ACR_SCOPE, CredentialSource, DefaultCredentialChain, EnvironmentCredential, ManagedIdentityCredential,
    WorkloadIdentityCredential,
};
use docker_credential_acr::{HelperConfig, HelperError, Logger};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token_body(token: &str) -> String {
    format!(r#"{{"access_token":"{}","expires_in":3599,"token_type":"Bearer"}}"#, token)
}

fn service_principal_config(server: &MockServer) -> HelperConfig {
    let config = HelperConfig::default()
        .with_tenant_id(Some("tenant-1".to_string()))
        .with_authority_host(server.uri());
    HelperConfig {
        client_id: Some("client-1".to_string()),
        ..config
    }
}

#[tokio::test]
async fn environment_credential_uses_client_secret() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .and(body_string_contains("client_secret=s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(token_body("env-token"), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = HelperConfig {
        client_secret: Some("s3cret".to_string()),
        ..service_principal_config(&server)
    };
    let credential = EnvironmentCredential::new(reqwest::Client::new(), &config);

    let token = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap();
    assert_eq!(token, "env-token");
}

#[tokio::test]
async fn environment_credential_unavailable_without_secret() {
    let server = MockServer::start().await;
    let credential = EnvironmentCredential::new(reqwest::Client::new(), &service_principal_config(&server));

    let err = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap_err();
    assert!(matches!(err, HelperError::CredentialUnavailable(_)));
    assert!(err.to_string().starts_with("unavailable"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn environment_credential_reports_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#))
        .mount(&server)
        .await;

    let config = HelperConfig {
        client_secret: Some("wrong".to_string()),
        ..service_principal_config(&server)
    };
    let credential = EnvironmentCredential::new(reqwest::Client::new(), &config);

    let err = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap_err();
    assert!(matches!(err, HelperError::Credential(_)));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn workload_identity_sends_federated_assertion() {
    let server = MockServer::start().await;

    let mut token_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(token_file, "federated-assertion").unwrap();

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .and(body_string_contains("client_assertion=federated-assertion"))
        .and(body_string_contains(
            "client_assertion_type=urn%3Aietf%3Aparams%3Aoauth%3Aclient-assertion-type%3Ajwt-bearer",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(token_body("wi-token"), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = HelperConfig {
        federated_token_file: Some(token_file.path().display().to_string()),
        ..service_principal_config(&server)
    };
    let credential = WorkloadIdentityCredential::new(reqwest::Client::new(), &config);

    let token = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap();
    assert_eq!(token, "wi-token");
}

#[tokio::test]
async fn workload_identity_missing_file() {
    let server = MockServer::start().await;
    let config = HelperConfig {
        federated_token_file: Some("/nonexistent/azure-identity-token".to_string()),
        ..service_principal_config(&server)
    };
    let credential = WorkloadIdentityCredential::new(reqwest::Client::new(), &config);

    let err = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap_err();
    assert!(err.to_string().contains("failed to read federated token file"));
}

#[tokio::test]
async fn managed_identity_queries_imds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/identity/oauth2/token"))
        .and(query_param("api-version", "2018-02-01"))
        .and(query_param("resource", "https://containerregistry.azure.net"))
        .and(header("Metadata", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(token_body("mi-token"), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = HelperConfig::default().with_imds_endpoint(server.uri());
    let credential = ManagedIdentityCredential::new(&config).unwrap();

    let token = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap();
    assert_eq!(token, "mi-token");
}

#[tokio::test]
async fn managed_identity_prefers_app_service_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/msi/token"))
        .and(query_param("api-version", "2019-08-01"))
        .and(query_param("client_id", "user-assigned"))
        .and(header("X-IDENTITY-HEADER", "identity-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(token_body("app-token"), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = HelperConfig {
        client_id: Some("user-assigned".to_string()),
        identity_endpoint: Some(format!("{}/msi/token", server.uri())),
        identity_header: Some("identity-secret".to_string()),
        ..HelperConfig::default()
    };
    let credential = ManagedIdentityCredential::new(&config).unwrap();

    let token = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap();
    assert_eq!(token, "app-token");
}

#[tokio::test]
async fn managed_identity_without_identity_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/identity/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_request","error_description":"Identity not found"}"#))
        .mount(&server)
        .await;

    let config = HelperConfig::default().with_imds_endpoint(server.uri());
    let credential = ManagedIdentityCredential::new(&config).unwrap();

    let err = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap_err();
    assert!(matches!(err, HelperError::CredentialUnavailable(_)));
    assert!(err.to_string().contains("Identity not found"));
}

#[tokio::test]
async fn managed_identity_unreachable_imds_is_unavailable() {
    let config = HelperConfig::default().with_imds_endpoint("http://127.0.0.1:1");
    let credential = ManagedIdentityCredential::new(&config).unwrap();

    let err = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap_err();
    assert!(matches!(err, HelperError::CredentialUnavailable(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn managed_identity_server_error_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/identity/oauth2/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = HelperConfig::default().with_imds_endpoint(server.uri());
    let credential = ManagedIdentityCredential::new(&config).unwrap();

    let err = credential.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap_err();
    assert!(matches!(err, HelperError::Credential(_)));
}

#[tokio::test]
async fn rejected_client_secret_stops_the_chain() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/metadata/identity/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(token_body("mi-token"), "application/json"))
        .expect(0)
        .mount(&server)
        .await;

    let config = HelperConfig {
        client_secret: Some("wrong".to_string()),
        ..service_principal_config(&server)
    }
    .with_imds_endpoint(server.uri());

    let sources: Vec<Box<dyn CredentialSource>> = vec![
        Box::new(EnvironmentCredential::new(reqwest::Client::new(), &config)),
        Box::new(ManagedIdentityCredential::new(&config).unwrap()),
    ];
    let chain = DefaultCredentialChain::new(sources, Duration::from_secs(5));

    let err = chain.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap_err();
    assert!(err.to_string().starts_with("EnvironmentCredential authentication failed"));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn unavailable_sources_fall_through_to_managed_identity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/identity/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(token_body("mi-token"), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = HelperConfig::default().with_imds_endpoint(server.uri());
    let sources: Vec<Box<dyn CredentialSource>> = vec![
        Box::new(EnvironmentCredential::new(reqwest::Client::new(), &config)),
        Box::new(WorkloadIdentityCredential::new(reqwest::Client::new(), &config)),
        Box::new(ManagedIdentityCredential::new(&config).unwrap()),
    ];
    let chain = DefaultCredentialChain::new(sources, Duration::from_secs(5));

    let token = chain.get_token(ACR_SCOPE, &Logger::new_quiet()).await.unwrap();
    assert_eq!(token, "mi-token");
}
