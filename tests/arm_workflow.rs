//! End-to-end tests of the bastion workflows against a mocked Azure
//! Resource Manager endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bastion_k8s::cloud::{ArmClient, ArmSettings, StaticTokenCredential};
use bastion_k8s::controller::{BastionHostService, BastionSpec, ClusterScope};
use bastion_k8s::Error;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NETWORK: &str = "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Network";

struct TestScope {
    specs: Vec<BastionSpec>,
    tags: BTreeMap<String, String>,
}

impl ClusterScope for TestScope {
    fn resource_group(&self) -> &str {
        "rg1"
    }

    fn location(&self) -> &str {
        "eastus"
    }

    fn cluster_name(&self) -> &str {
        "capz-e2e"
    }

    fn additional_tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    fn bastion_specs(&self) -> Vec<BastionSpec> {
        self.specs.clone()
    }
}

fn bastion_spec(name: &str) -> BastionSpec {
    BastionSpec {
        name: name.to_string(),
        vnet_name: "vnet1".to_string(),
        subnet_name: "snet1".to_string(),
        public_ip_name: "pip1".to_string(),
    }
}

fn service(server: &MockServer, specs: Vec<BastionSpec>) -> BastionHostService {
    let arm = ArmClient::new(
        reqwest::Client::new(),
        Arc::new(StaticTokenCredential::new("e2e-token")),
        ArmSettings {
            endpoint: server.uri(),
            subscription_id: "sub-1".to_string(),
            poll_interval: Duration::from_millis(10),
            operation_timeout: Duration::from_secs(5),
        },
    );
    BastionHostService::with_arm_client(
        Arc::new(TestScope {
            specs,
            tags: BTreeMap::new(),
        }),
        arm,
    )
}

async fn mount_subnet(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{NETWORK}/virtualNetworks/vnet1/subnets/snet1")))
        .and(query_param("api-version", "2019-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "/subnets/snet1",
            "name": "snet1",
            "properties": {"addressPrefix": "10.1.255.0/24"}
        })))
        .mount(server)
        .await;
}

async fn put_body(server: &MockServer, resource_path: &str) -> Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT" && r.url.path() == resource_path)
        .unwrap_or_else(|| panic!("no PUT to {resource_path}"));
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_reconcile_creates_missing_public_ip_and_bastion() {
    let server = MockServer::start().await;
    mount_subnet(&server).await;

    let pip_path = format!("{NETWORK}/publicIPAddresses/pip1");
    let bastion_path = format!("{NETWORK}/bastionHosts/b1");

    Mock::given(method("GET"))
        .and(path(pip_path.as_str()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceNotFound", "message": "pip1 was not found"}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(pip_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "/publicIPAddresses/pip1",
            "name": "pip1",
            "properties": {"ipAddress": "20.1.2.3"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(pip_path.as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let operation_url = format!("{}/operations/bastion-b1", server.uri());
    Mock::given(method("PUT"))
        .and(path(bastion_path.as_str()))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Azure-AsyncOperation", operation_url.as_str())
                .set_body_json(json!({})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/bastion-b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
        .expect(1)
        .mount(&server)
        .await;

    service(&server, vec![bastion_spec("b1")])
        .reconcile()
        .await
        .unwrap();

    let pip = put_body(&server, &pip_path).await;
    assert_eq!(pip["sku"]["name"], "Standard");
    assert_eq!(pip["location"], "eastus");
    assert_eq!(pip["properties"]["publicIPAllocationMethod"], "Static");
    assert_eq!(pip["properties"]["publicIPAddressVersion"], "IPv4");
    assert_eq!(pip["properties"]["dnsSettings"]["domainNameLabel"], "pip1");

    let bastion = put_body(&server, &bastion_path).await;
    assert_eq!(bastion["name"], "b1");
    assert_eq!(bastion["properties"]["dnsName"], "b1-bastion");
    assert_eq!(
        bastion["tags"]["sigs.k8s.io_cluster-api-provider-azure_cluster_capz-e2e"],
        "owned"
    );
    let configs = bastion["properties"]["ipConfigurations"]
        .as_array()
        .unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0]["name"], "b1-bastionIP");
    assert_eq!(configs[0]["properties"]["subnet"]["id"], "/subnets/snet1");
    assert_eq!(
        configs[0]["properties"]["publicIPAddress"]["id"],
        "/publicIPAddresses/pip1"
    );
    assert_eq!(
        configs[0]["properties"]["privateIPAllocationMethod"],
        "Static"
    );
}

#[tokio::test]
async fn test_reconcile_reports_failed_bastion_operation() {
    let server = MockServer::start().await;
    mount_subnet(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{NETWORK}/publicIPAddresses/pip1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "/publicIPAddresses/pip1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{NETWORK}/publicIPAddresses/pip1")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{NETWORK}/bastionHosts/b1")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "BastionHostSkuNotSupported",
                "message": "the subnet is too small"
            }
        })))
        .mount(&server)
        .await;

    let err = service(&server, vec![bastion_spec("b1")])
        .reconcile()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CreateBastionHost(_)));
    assert!(err.to_string().contains("cannot create bastion host"));
    assert!(err.to_string().contains("BastionHostSkuNotSupported"));
}

#[tokio::test]
async fn test_delete_stops_at_first_missing_host() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{NETWORK}/bastionHosts/b1")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceNotFound", "message": "b1 was not found"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{NETWORK}/bastionHosts/b2")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    service(&server, vec![bastion_spec("b1"), bastion_spec("b2")])
        .delete()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_waits_for_completion() {
    let server = MockServer::start().await;
    let location = format!("{}/operations/delete-b1", server.uri());

    Mock::given(method("DELETE"))
        .and(path(format!("{NETWORK}/bastionHosts/b1")))
        .respond_with(ResponseTemplate::new(202).insert_header("Location", location.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/delete-b1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    service(&server, vec![bastion_spec("b1")])
        .delete()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_failure_is_wrapped() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{NETWORK}/bastionHosts/b1")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": "AnotherOperationInProgress", "message": "busy"}
        })))
        .mount(&server)
        .await;

    let err = service(&server, vec![bastion_spec("b1")])
        .delete()
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("failed to delete Bastion Host b1 in resource group rg1"));
    assert!(matches!(
        err.azure_source(),
        Some(bastion_k8s::cloud::AzureError::ApiError { status: 409, .. })
    ));
}
