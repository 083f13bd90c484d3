pub mod admin;
pub mod front;

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};

pub(super) const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

pub(super) fn text_response(status: StatusCode, body: String) -> Response {
  let mut res = (status, body).into_response();
  res.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_TEXT));
  res
}
