//! In-memory stand-in for the remote animal API.
//!
//! Serves `/dog` and `/dog/{id}` with the same JSON shapes a hosted mock API
//! uses. Ids are assigned by the server and never reused.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    pub id: u64,
    pub name: String,
    pub avatar: String,
    pub date: String,
}

/// Body of `POST /dog` and `PUT /dog/{id}`. A client-sent `id` is ignored.
#[derive(Deserialize)]
pub struct AnimalInput {
    pub name: String,
    pub avatar: String,
    pub date: String,
}

#[derive(Debug, Default)]
pub struct Store {
    animals: BTreeMap<u64, Animal>,
    next_id: u64,
}

impl Store {
    pub fn seeded(seed: Vec<Animal>) -> Self {
        let next_id = seed.iter().map(|a| a.id).max().unwrap_or(0).saturating_add(1);
        Self {
            animals: seed.into_iter().map(|a| (a.id, a)).collect(),
            next_id,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id.saturating_add(1);
        id
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Router over an empty store.
pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router over a store pre-filled with `seed`.
pub fn app_with(seed: Vec<Animal>) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded(seed)));
    Router::new()
        .route("/dog", get(list_animals).post(create_animal))
        .route("/dog/{id}", get(get_animal).put(update_animal).delete(delete_animal))
        .with_state(db)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn list_animals(State(db): State<Db>) -> Json<Vec<Animal>> {
    let store = db.read().await;
    Json(store.animals.values().cloned().collect())
}

async fn create_animal(
    State(db): State<Db>,
    Json(input): Json<AnimalInput>,
) -> (StatusCode, Json<Animal>) {
    let mut store = db.write().await;
    let animal = Animal {
        id: store.allocate_id(),
        name: input.name,
        avatar: input.avatar,
        date: input.date,
    };
    store.animals.insert(animal.id, animal.clone());
    info!(id = animal.id, "created");
    (StatusCode::CREATED, Json(animal))
}

async fn get_animal(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Animal>, StatusCode> {
    let store = db.read().await;
    store.animals.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_animal(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<AnimalInput>,
) -> Result<Json<Animal>, StatusCode> {
    let mut store = db.write().await;
    let animal = store.animals.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    animal.name = input.name;
    animal.avatar = input.avatar;
    animal.date = input.date;
    info!(id, "updated");
    Ok(Json(animal.clone()))
}

async fn delete_animal(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store.animals.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    info!(id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}
