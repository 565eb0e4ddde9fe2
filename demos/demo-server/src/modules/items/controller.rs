use baton::prelude::*;
use serde::Serialize;
use std::future::Future;
use uuid::Uuid;

use super::model::{CreateItem, Item, UpdateItem};
use super::store::ItemStore;

/// CRUD over the in-memory item collection
pub struct ItemsController {
    store: Arc<ItemStore>,
}

impl ItemsController {
    pub fn new(store: Arc<ItemStore>) -> Self {
        Self { store }
    }

    async fn list(&self, args: Args) -> Result<Vec<Item>, HandlerError> {
        let done = match args.optional::<String>(0)?.as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                return Err(HttpError::bad_request(format!("invalid done filter '{other}'")).into());
            }
        };
        Ok(self.store.list(done))
    }

    async fn find_one(&self, args: Args) -> Result<Item, HandlerError> {
        let id: Uuid = args.parsed(0)?;
        self.store.get(&id).ok_or_else(|| Self::unknown_item(&id))
    }

    /// Creating an item whose label already exists returns the existing one
    /// with a plain 200 instead of the creation preset.
    async fn create(&self, args: Args, context: CallContext) -> Result<Item, HandlerError> {
        let payload: CreateItem = args.required(0)?;
        if let Some(existing) = self.store.find_by_label(&payload.label) {
            if let Some(response) = context.response() {
                response.set_status(StatusCode::OK);
            }
            return Ok(existing);
        }
        let item = Item::new(payload.label);
        self.store.insert(item.clone());
        Ok(item)
    }

    async fn update(&self, args: Args) -> Result<Item, HandlerError> {
        let id: Uuid = args.parsed(0)?;
        let patch: UpdateItem = args.optional(1)?.unwrap_or_default();
        self.store
            .update(&id, |item| {
                if let Some(label) = patch.label {
                    item.label = label;
                }
                if let Some(done) = patch.done {
                    item.done = done;
                }
            })
            .ok_or_else(|| Self::unknown_item(&id))
    }

    async fn remove(&self, args: Args) -> Result<(), HandlerError> {
        let id: Uuid = args.parsed(0)?;
        self.store
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::unknown_item(&id))
    }

    fn unknown_item(id: &Uuid) -> HandlerError {
        HttpError::not_found(format!("item {id} does not exist")).into()
    }
}

/// Declare the bindings and routes of the items API
pub fn items_routes() -> Routes {
    let store = Arc::new(ItemStore::new());
    let controller = Arc::new(ItemsController::new(store));

    let bindings = Arc::new(BindingRegistry::of::<ItemsController>());
    bindings
        .bind_query("list", 0, "done")
        .bind_path_param("find_one", 0, "id")
        .bind_body("create", 0)
        .bind_path_param("update", 0, "id")
        .bind_body("update", 1)
        .bind_path_param("remove", 0, "id")
        .bind_response_slot("response");

    Routes::new()
        .param(
            "id",
            param_hook_fn(|value, _request| async move {
                Uuid::parse_str(&value).map(|_| ()).map_err(|_| {
                    HttpError::bad_request(format!("'{value}' is not a valid item id")).into()
                })
            }),
        )
        .get(
            "/items",
            endpoint(&controller, &bindings, "list", |c, args, _context| {
                async move { c.list(args).await }
            }),
        )
        .get(
            "/items/{id}",
            endpoint(&controller, &bindings, "find_one", |c, args, _context| {
                async move { c.find_one(args).await }
            }),
        )
        .post(
            "/items",
            endpoint(&controller, &bindings, "create", |c, args, context| {
                async move { c.create(args, context).await }
            }),
        )
        .put(
            "/items/{id}",
            endpoint(&controller, &bindings, "update", |c, args, _context| {
                async move { c.update(args).await }
            }),
        )
        .delete(
            "/items/{id}",
            endpoint(&controller, &bindings, "remove", |c, args, _context| {
                async move { c.remove(args).await }
            }),
        )
}

/// Pair one controller method with the shared bindings, handing the
/// controller instance to the handler on every call
fn endpoint<F, Fut, T>(
    controller: &Arc<ItemsController>,
    bindings: &Arc<BindingRegistry>,
    method: MethodKey,
    handler: F,
) -> Endpoint
where
    F: Fn(Arc<ItemsController>, Args, CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, HandlerError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let controller = Arc::clone(controller);
    Endpoint::new(
        Arc::clone(bindings),
        method,
        operation_fn(move |args, context| handler(Arc::clone(&controller), args, context)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::Method;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_item(label: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/items")
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"label":"{label}"}}"#)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_item_lifecycle_over_http() {
        let router = items_routes().into_router();

        let created = router.clone().oneshot(post_item("groceries")).await.unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = body_json(created).await["id"].as_str().unwrap().to_string();

        let updated = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/items/{id}"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"done":true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        assert_eq!(body_json(updated).await["done"], Value::Bool(true));

        let listed = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/items?done=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(listed).await.as_array().unwrap().len(), 1);

        let removed = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/items/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);

        let missing = router
            .oneshot(
                Request::builder()
                    .uri(format!("/items/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_label_returns_the_existing_item_with_200() {
        let router = items_routes().into_router();

        let first = router.clone().oneshot(post_item("groceries")).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let first_id = body_json(first).await["id"].clone();

        let second = router.oneshot(post_item("groceries")).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_json(second).await["id"], first_id);
    }

    #[tokio::test]
    async fn test_malformed_item_id_is_rejected_before_the_handler() {
        let router = items_routes().into_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/items/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "'not-a-uuid' is not a valid item id"
        );
    }
}
