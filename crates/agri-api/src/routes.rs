//! HTTP routes.
//!
//! | Method | Path                  | Handler          |
//! |--------|-----------------------|------------------|
//! | GET    | /diseases             | list_diseases    |
//! | POST   | /diseases             | add_disease      |
//! | GET    | /suppliers            | list_suppliers   |
//! | POST   | /suppliers            | add_supplier     |
//! | GET    | /weather/current      | current_weather  |
//! | GET    | /tasks                | list_tasks       |
//! | POST   | /tasks                | add_task         |
//! | DELETE | /tasks/{id}           | delete_task      |
//! | PATCH  | /tasks/{id}/toggle    | toggle_task      |
//! | GET    | /news/agriculture     | agriculture_news |

use std::convert::Infallible;
use std::sync::Arc;

use agri_core::AppError;
use agri_news::NewsArticle;
use agri_services::{Disease, NewDisease, NewSupplier, NewTask, Supplier, Task};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::app_services::AppServices;
use crate::reply::{handle_rejection, respond};

/// Request bodies larger than this are refused before deserialization.
const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Debug, Serialize)]
struct DiseasesBody {
    diseases: Vec<Disease>,
}

#[derive(Debug, Serialize)]
struct SuppliersBody {
    suppliers: Vec<Supplier>,
}

#[derive(Debug, Serialize)]
struct TasksBody {
    tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
struct TaskBody {
    task: Task,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ArticlesBody {
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The complete API, with rejection recovery and request logging.
pub fn routes(
    services: Arc<AppServices>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    disease_routes(services.clone())
        .or(supplier_routes(services.clone()))
        .or(task_routes(services.clone()))
        .or(weather_routes(services.clone()))
        .or(news_routes(services))
        .recover(handle_rejection)
        .with(warp::log("agri_api::http"))
}

fn with_services(
    services: Arc<AppServices>,
) -> impl Filter<Extract = (Arc<AppServices>,), Error = Infallible> + Clone {
    warp::any().map(move || services.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn disease_routes(
    services: Arc<AppServices>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::path!("diseases")
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(list_diseases);

    let add = warp::path!("diseases")
        .and(warp::post())
        .and(json_body::<NewDisease>())
        .and(with_services(services))
        .and_then(add_disease);

    list.or(add).unify()
}

fn supplier_routes(
    services: Arc<AppServices>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::path!("suppliers")
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(list_suppliers);

    let add = warp::path!("suppliers")
        .and(warp::post())
        .and(json_body::<NewSupplier>())
        .and(with_services(services))
        .and_then(add_supplier);

    list.or(add).unify()
}

fn task_routes(
    services: Arc<AppServices>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::path!("tasks")
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(list_tasks);

    let add = warp::path!("tasks")
        .and(warp::post())
        .and(json_body::<NewTask>())
        .and(with_services(services.clone()))
        .and_then(add_task);

    let delete = warp::path!("tasks" / String)
        .and(warp::delete())
        .and(with_services(services.clone()))
        .and_then(delete_task);

    let toggle = warp::path!("tasks" / String / "toggle")
        .and(warp::patch())
        .and(with_services(services))
        .and_then(toggle_task);

    list.or(add).unify().or(delete).unify().or(toggle).unify()
}

fn weather_routes(
    services: Arc<AppServices>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("weather" / "current")
        .and(warp::get())
        .and(warp::query::<Coordinates>())
        .and(with_services(services))
        .and_then(current_weather)
}

fn news_routes(
    services: Arc<AppServices>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("news" / "agriculture")
        .and(warp::get())
        .and(with_services(services))
        .and_then(agriculture_news)
}

async fn list_diseases(services: Arc<AppServices>) -> Result<Response, Rejection> {
    let result = services.diseases.list().await;
    Ok(respond(result.map(|diseases| DiseasesBody { diseases })))
}

async fn add_disease(
    disease: NewDisease,
    services: Arc<AppServices>,
) -> Result<Response, Rejection> {
    Ok(respond(services.diseases.add(disease).await))
}

async fn list_suppliers(services: Arc<AppServices>) -> Result<Response, Rejection> {
    let result = services.suppliers.list().await;
    Ok(respond(result.map(|suppliers| SuppliersBody { suppliers })))
}

async fn add_supplier(
    supplier: NewSupplier,
    services: Arc<AppServices>,
) -> Result<Response, Rejection> {
    Ok(respond(services.suppliers.add(supplier).await))
}

async fn current_weather(
    coords: Coordinates,
    services: Arc<AppServices>,
) -> Result<Response, Rejection> {
    if !coords.lat.is_finite() || !coords.lon.is_finite() {
        return Ok(respond::<(), _>(Err(AppError::invalid_request(
            "lat and lon must be finite numbers",
        ))));
    }
    Ok(respond(services.weather.get(coords.lat, coords.lon).await))
}

async fn list_tasks(services: Arc<AppServices>) -> Result<Response, Rejection> {
    let result = services.tasks.list().await;
    Ok(respond(result.map(|tasks| TasksBody { tasks })))
}

async fn add_task(new_task: NewTask, services: Arc<AppServices>) -> Result<Response, Rejection> {
    let result = services.tasks.add(new_task).await;
    Ok(respond(result.map(|task| TaskBody { task })))
}

async fn delete_task(id: String, services: Arc<AppServices>) -> Result<Response, Rejection> {
    let result = services.tasks.delete(&id).await;
    Ok(respond(result.map(|()| MessageBody {
        message: "Task deleted successfully",
    })))
}

async fn toggle_task(id: String, services: Arc<AppServices>) -> Result<Response, Rejection> {
    let result = services.tasks.toggle(&id).await;
    Ok(respond(result.map(|task| TaskBody { task })))
}

async fn agriculture_news(services: Arc<AppServices>) -> Result<Response, Rejection> {
    let articles = services.news.get().await;
    Ok(warp::reply::json(&ArticlesBody { articles }).into_response())
}
