//! HTML front end: the input form and the rendered result page

use std::any::Any;

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::debug;

use crate::LookupError;
use crate::api::{log_failure, status_for};
use crate::models::{CoordinateValue, LocationQuery, WeatherResult};
use crate::web::AppState;

const FORM_PAGE: &str = include_str!("../templates/form.html");
const RESULT_LAYOUT: &str = include_str!("../templates/result.html");

/// Fields of the lookup form. Browsers send every field, often empty.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherForm {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

impl WeatherForm {
    pub fn to_query(&self) -> crate::Result<LocationQuery> {
        let latitude = self.latitude.as_deref().map(CoordinateValue::from);
        let longitude = self.longitude.as_deref().map(CoordinateValue::from);
        LocationQuery::parse(
            self.location.as_deref(),
            latitude.as_ref(),
            longitude.as_ref(),
        )
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(form_page))
        .route("/weather-html", post(post_weather_html))
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// Browsers get an error page rather than the JSON body of the outer handler
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let err = LookupError::from_panic(panic);
    log_failure(&err);
    (status_for(&err), Html(render_error(&err.user_message()))).into_response()
}

async fn form_page() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn post_weather_html(
    State(state): State<AppState>,
    form: Result<Form<WeatherForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            debug!("Rejected form submission: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Html(render_error("Invalid form submission")),
            );
        }
    };

    let outcome = match form.to_query() {
        Ok(query) => state.service.lookup(&query).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(result) => (StatusCode::OK, Html(render_result(&result))),
        Err(err) => {
            log_failure(&err);
            (status_for(&err), Html(render_error(&err.user_message())))
        }
    }
}

/// Escape text for use in HTML element content and attribute values
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            // keeps layout placeholders out of interpolated text
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn layout(title: &str, content: &str) -> String {
    RESULT_LAYOUT
        .replace("{{title}}", title)
        .replace("{{content}}", content)
}

/// Page for a failed lookup
#[must_use]
pub fn render_error(message: &str) -> String {
    let content = format!(
        "    <h1>Weather Lookup</h1>\n    <p class=\"error\">{}</p>\n",
        escape(message)
    );
    layout("Weather Lookup - Error", &content)
}

/// Page for a successful lookup
#[must_use]
pub fn render_result(result: &WeatherResult) -> String {
    let location = escape(&result.location);
    let current = &result.current;

    let mut content = format!(
        r#"    <h1>Weather for {location}</h1>
    <div class="current">
        <img src="{icon}" alt="{description}">
        <div>
            <p><strong>{temperature}</strong>, {description}</p>
            <p>Humidity: {humidity}</p>
        </div>
    </div>
"#,
        icon = escape(&current.icon_url),
        description = escape(&current.description),
        temperature = escape(&current.format_temperature()),
        humidity = escape(&current.format_humidity()),
    );

    content.push_str("    <h2>5-day forecast</h2>\n");
    if result.forecast.is_empty() {
        content.push_str("    <p>No forecast available.</p>\n");
    } else {
        content.push_str(
            "    <table>\n        <tr><th>Time</th><th></th><th>Temperature</th><th>Conditions</th></tr>\n",
        );
        for entry in &result.forecast {
            content.push_str(&format!(
                "        <tr><td>{}</td><td><img src=\"{}\" alt=\"\"></td><td>{}</td><td>{}</td></tr>\n",
                escape(&entry.datetime),
                escape(&entry.icon_url),
                escape(&entry.format_temperature()),
                escape(&entry.description),
            ));
        }
        content.push_str("    </table>\n");
    }

    layout(&format!("Weather for {location}"), &content)
}
