use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sqlx::mysql::MySqlPool;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{
    created, CityFilterQuery, CourseDetail, CourseSummary, CreateCourseRequest, CreatedResponse,
    HoleWithCourse,
};

// GET /api/campos?cidade_id= - List active courses with city name and hole count
pub async fn get_courses(
    State(pool): State<MySqlPool>,
    ApiQuery(params): ApiQuery<CityFilterQuery>,
) -> Result<Json<Vec<CourseSummary>>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let courses = db::get_active_courses(&mut conn, params.cidade_id).await?;

    Ok(Json(courses))
}

// GET /api/campos/{id} - Get an active course with its holes
pub async fn get_course_by_id(
    State(pool): State<MySqlPool>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<CourseDetail>, ApiError> {
    let mut conn = db::connect(&pool).await?;

    let course = db::get_course_by_id(&mut conn, course_id)
        .await?
        .ok_or(ApiError::NotFound("Course not found"))?;

    let pistas = db::get_course_holes(&mut conn, course_id).await?;

    Ok(Json(CourseDetail { course, pistas }))
}

// GET /api/campos/{id}/pistas - List the active holes of a course
pub async fn get_course_holes(
    State(pool): State<MySqlPool>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Vec<HoleWithCourse>>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let holes = db::get_course_holes_with_course(&mut conn, course_id).await?;

    Ok(Json(holes))
}

// POST /api/campos - Create a course
pub async fn create_course(
    State(pool): State<MySqlPool>,
    ApiJson(req): ApiJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let course = req.validate()?;

    let mut conn = db::connect(&pool).await?;
    let id = db::insert_course(&mut conn, &course).await?;

    tracing::info!("Created {} course {} ({})", course.tipo, id, course.nome);
    Ok(created(id, "Course created successfully"))
}
