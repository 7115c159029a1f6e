use async_trait::async_trait;
use org_directory::app::http;
use org_directory::domain::model::{
    Department, DepartmentBudget, Employee, EmployeeReport, ManagerUpdate, NewEmployee, NewRole,
    Role, RoleReport,
};
use org_directory::domain::ports::DirectoryStore;
use org_directory::utils::error::{StoreError, StoreResult};
use org_directory::{DirectoryService, SqliteStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

async fn spawn_server() -> String {
    spawn_server_over(SqliteStore::open_in_memory().unwrap()).await
}

async fn spawn_server_over<S: DirectoryStore + 'static>(store: S) -> String {
    let service = Arc::new(DirectoryService::new(store));
    let app = http::router(service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn post(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let response = client.post(url).json(&body).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn get(client: &Client, url: String) -> (StatusCode, Value) {
    let response = client.get(url).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn put(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let response = client.put(url).json(&body).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_create_and_list_over_http() {
    let base = spawn_server().await;
    let client = Client::new();

    let (status, body) = post(
        &client,
        format!("{}/api/new-department", base),
        json!({"name": "Engineering"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["name"], "Engineering");
    let department_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = post(
        &client,
        format!("{}/api/new-role", base),
        json!({"title": "Engineer", "salary": 90000, "department_id": department_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let role_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = post(
        &client,
        format!("{}/api/new-employee", base),
        json!({"first_name": "Ada", "last_name": "Lovelace", "role_id": role_id, "manager_id": null}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["manager_id"], Value::Null);

    let (status, body) = get(&client, format!("{}/api/departments", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{"id": department_id, "name": "Engineering"}]));

    let (_, body) = get(&client, format!("{}/api/roles", base)).await;
    assert_eq!(body["data"][0]["department_id"], department_id);

    let (_, body) = get(&client, format!("{}/api/roles?view=report", base)).await;
    assert_eq!(body["data"][0]["department"], "Engineering");

    let (_, body) = get(&client, format!("{}/api/employees?view=report", base)).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["first_name"], "Ada");
    assert_eq!(rows[0]["role_title"], "Engineer");
    assert_eq!(rows[0]["manager_full_name"], Value::Null);

    let (_, body) = get(&client, format!("{}/api/department-budgets", base)).await;
    assert_eq!(body["data"][0]["headcount"], 1);
    assert_eq!(body["data"][0]["total_salary"], 90000.0);
}

#[tokio::test]
async fn test_errors_use_error_body() {
    let base = spawn_server().await;
    let client = Client::new();

    let (status, body) = post(
        &client,
        format!("{}/api/new-role", base),
        json!({"title": "Ghost", "salary": 1, "department_id": 12}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("department"));

    let (status, body) = post(&client, format!("{}/api/new-department", base), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let response = client
        .post(format!("{}/api/new-department", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let (status, body) = get(&client, format!("{}/api/employees?view=sideways", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_update_employee_role_over_http() {
    let base = spawn_server().await;
    let client = Client::new();

    post(
        &client,
        format!("{}/api/new-department", base),
        json!({"name": "Ops"}),
    )
    .await;
    post(
        &client,
        format!("{}/api/new-role", base),
        json!({"title": "Operator", "salary": 40000, "department_id": 1}),
    )
    .await;
    post(
        &client,
        format!("{}/api/new-role", base),
        json!({"title": "Supervisor", "salary": 60000, "department_id": 1}),
    )
    .await;
    post(
        &client,
        format!("{}/api/new-employee", base),
        json!({"first_name": "Grace", "last_name": "Hopper", "role_id": 1}),
    )
    .await;

    let (status, body) = put(
        &client,
        format!("{}/api/update-employee-role/1", base),
        json!({"role_id": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "success", "changes": 1, "id": 1}));

    let (status, body) = put(
        &client,
        format!("{}/api/update-employee-role/0", base),
        json!({"role_id": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Employee not found"}));

    let (status, body) = put(
        &client,
        format!("{}/api/update-employee-role/99", base),
        json!({"role_id": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Employee not found"}));

    let (status, body) = put(
        &client,
        format!("{}/api/update-employee-role/1", base),
        json!({"role_id": 77}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("role"));

    let (status, _) = put(
        &client,
        format!("{}/api/update-employee-manager/1", base),
        json!({"manager_id": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&client, format!("{}/api/employees", base)).await;
    assert_eq!(body["data"][0]["role_id"], 2);
    assert_eq!(body["data"][0]["manager_id"], Value::Null);
}

/// Every call fails as if the database could not be reached.
struct OfflineStore;

fn offline<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("database is offline".to_string()))
}

#[async_trait]
impl DirectoryStore for OfflineStore {
    async fn insert_department(&self, _name: &str) -> StoreResult<i64> {
        offline()
    }
    async fn insert_role(&self, _role: &NewRole) -> StoreResult<i64> {
        offline()
    }
    async fn insert_employee(&self, _employee: &NewEmployee) -> StoreResult<i64> {
        offline()
    }
    async fn departments(&self) -> StoreResult<Vec<Department>> {
        offline()
    }
    async fn roles(&self) -> StoreResult<Vec<Role>> {
        offline()
    }
    async fn role_report(&self) -> StoreResult<Vec<RoleReport>> {
        offline()
    }
    async fn employees(&self) -> StoreResult<Vec<Employee>> {
        offline()
    }
    async fn employee_report(&self) -> StoreResult<Vec<EmployeeReport>> {
        offline()
    }
    async fn department_budgets(&self) -> StoreResult<Vec<DepartmentBudget>> {
        offline()
    }
    async fn update_employee_role(&self, _employee_id: i64, _role_id: i64) -> StoreResult<u64> {
        offline()
    }
    async fn update_employee_manager(
        &self,
        _employee_id: i64,
        _manager_id: Option<i64>,
    ) -> StoreResult<ManagerUpdate> {
        offline()
    }
}

#[tokio::test]
async fn test_unavailable_store_answers_server_error() {
    let base = spawn_server_over(OfflineStore).await;
    let client = Client::new();

    for path in ["departments", "roles", "employees?view=report", "department-budgets"] {
        let (status, body) = get(&client, format!("{}/api/{}", base, path)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "GET {}", path);
        assert!(body["error"].is_string());
    }

    let (status, body) = post(
        &client,
        format!("{}/api/new-department", base),
        json!({"name": "Ops"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("offline"));

    let (status, _) = put(
        &client,
        format!("{}/api/update-employee-role/1", base),
        json!({"role_id": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Bad input is still rejected before the store is reached.
    let (status, _) = post(&client, format!("{}/api/new-department", base), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
