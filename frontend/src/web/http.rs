//! Browser transport over `gloo-net` (`fetch`).

use async_trait::async_trait;
use gloo_net::http::{Method, RequestBuilder};
use shopdesk_shared::protocol::HttpMethod;
use wasm_bindgen::JsValue;
use web_sys::FormData;

use crate::api::{ApiError, HttpRequest, HttpResponse, HttpTransport, RequestBody, Upload};

fn method(m: HttpMethod) -> Method {
    match m {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn js_error(err: JsValue) -> ApiError {
    ApiError::Encode(format!("{:?}", err))
}

fn form_data(fields: &[(String, String)], file_field: &str, file: Option<&Upload>) -> Result<FormData, ApiError> {
    let form = FormData::new().map_err(js_error)?;
    for (name, value) in fields {
        form.append_with_str(name, value).map_err(js_error)?;
    }
    if let Some(file) = file {
        form.append_with_blob_and_filename(file_field, file, &file.name())
            .map_err(js_error)?;
    }
    Ok(form)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = RequestBuilder::new(&request.url).method(method(request.method));
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(request.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let built = match request.body {
            Some(RequestBody::Json(json)) => builder.body(json),
            Some(RequestBody::Multipart {
                fields,
                file_field,
                file,
            }) => builder.body(form_data(&fields, file_field, file.as_ref())?),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Encode(e.to_string()))?;

        let response = built
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
