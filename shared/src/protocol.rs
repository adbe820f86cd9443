use crate::{DateRange, LoginRequest, LoginResponse, ProductFilters, Record};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Text fields of a `multipart/form-data` body, plus the name of the file
/// part a caller may attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file_field: &'static str,
}

/// Request/response contract of one REST endpoint.
///
/// The request value itself is the JSON body for methods that carry one;
/// path parameters are `#[serde(skip)]` fields read by [`ApiRequest::path`].
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the call needs `Authorization: Bearer <access>`.
    const AUTHENTICATED: bool = true;

    /// Path relative to the API base, with a trailing slash.
    fn path(&self) -> String;

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn body(&self) -> Result<Option<String>, ProtocolError> {
        if Self::METHOD.has_body() {
            Ok(Some(serde_json::to_string(self)?))
        } else {
            Ok(None)
        }
    }

    /// Endpoints that take `multipart/form-data` return their fields here;
    /// the JSON [`ApiRequest::body`] is then not sent.
    fn form(&self) -> Option<MultipartForm> {
        None
    }
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/api/auth/login/".to_string()
    }
}

// =========================================================
// Sales analysis
// =========================================================

macro_rules! ranged_report {
    ($name:ident, $path:literal) => {
        #[derive(Debug, Clone, Serialize)]
        pub struct $name {
            #[serde(skip)]
            pub range: DateRange,
        }

        impl ApiRequest for $name {
            type Response = Vec<Record>;
            const METHOD: HttpMethod = HttpMethod::Get;

            fn path(&self) -> String {
                $path.to_string()
            }

            fn query(&self) -> Vec<(&'static str, String)> {
                self.range.query()
            }
        }
    };
}

ranged_report!(DailySalesRequest, "/api/salesanalysis/daily-sales/");
ranged_report!(
    ProductPerformanceRequest,
    "/api/salesanalysis/product-performance/"
);
ranged_report!(
    CategoryPerformanceRequest,
    "/api/salesanalysis/category-performance/"
);
ranged_report!(
    ProductPerformanceReportRequest,
    "/api/salesanalysis/product-performance/report/"
);

#[derive(Debug, Clone, Serialize)]
pub struct CustomerInsightsRequest;

impl ApiRequest for CustomerInsightsRequest {
    type Response = Vec<Record>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/salesanalysis/customer-insights/".to_string()
    }
}

/// Unfiltered product performance listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListProductPerformanceRequest;

impl ApiRequest for ListProductPerformanceRequest {
    type Response = Vec<Record>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/salesanalysis/product-performance/".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPerformanceDetailRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for ProductPerformanceDetailRequest {
    type Response = Record;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/api/salesanalysis/product-performance/{}/", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProductPerformanceRequest {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub entry: Record,
}

impl ApiRequest for UpdateProductPerformanceRequest {
    type Response = Record;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/salesanalysis/product-performance/{}/", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteProductPerformanceRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteProductPerformanceRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/api/salesanalysis/product-performance/{}/", self.id)
    }
}

// =========================================================
// Orders
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListOrdersRequest;

impl ApiRequest for ListOrdersRequest {
    type Response = Vec<Record>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/orders/orders/".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(skip)]
    pub id: String,
    pub status: crate::OrderStatus,
}

impl ApiRequest for UpdateOrderStatusRequest {
    /// The updated order.
    type Response = Record;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/orders/orders/{}/status/", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOrderRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteOrderRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/api/orders/orders/{}/delete/", self.id)
    }
}

// =========================================================
// Catalog
// =========================================================

/// Paged catalog listing, `{ "count": .., "results": [..] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<Record>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListProductsRequest {
    #[serde(skip)]
    pub filters: ProductFilters,
}

impl ApiRequest for ListProductsRequest {
    type Response = ProductPage;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/products/products/".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.filters.query()
    }
}

/// File part of the product forms. The listing returns it as a URL.
pub const PRODUCT_IMAGE_FIELD: &str = "image";

/// Server-owned product fields, never sent back on create or update.
pub const PRODUCT_READ_ONLY_FIELDS: &[&str] = &["id", PRODUCT_IMAGE_FIELD, "created_at", "updated_at"];

fn product_form(product: &Record) -> MultipartForm {
    MultipartForm {
        fields: product.form_fields(PRODUCT_READ_ONLY_FIELDS),
        file_field: PRODUCT_IMAGE_FIELD,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProductRequest {
    #[serde(flatten)]
    pub product: Record,
}

impl ApiRequest for CreateProductRequest {
    type Response = Record;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/products/products/".to_string()
    }

    fn form(&self) -> Option<MultipartForm> {
        Some(product_form(&self.product))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProductRequest {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub product: Record,
}

impl ApiRequest for UpdateProductRequest {
    type Response = Record;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/api/products/products/{}/", self.id)
    }

    fn form(&self) -> Option<MultipartForm> {
        Some(product_form(&self.product))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteProductRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteProductRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/api/products/products/{}/", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCategoriesRequest;

impl ApiRequest for ListCategoriesRequest {
    type Response = Vec<Record>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/products/categories/".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl ApiRequest for CreateCategoryRequest {
    type Response = Record;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/api/products/categories/".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrderStatus;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_login_is_public_post() {
        let req = LoginRequest {
            email: "admin@shop.test".into(),
            password: "pw".into(),
        };
        assert_eq!(<LoginRequest as ApiRequest>::METHOD, HttpMethod::Post);
        assert!(!<LoginRequest as ApiRequest>::AUTHENTICATED);
        let body: serde_json::Value =
            serde_json::from_str(&req.body().unwrap().unwrap()).unwrap();
        assert_eq!(body, json!({"email": "admin@shop.test", "password": "pw"}));
    }

    #[test]
    fn test_path_params_stay_out_of_body() {
        let req = UpdateOrderStatusRequest {
            id: "42".into(),
            status: OrderStatus::Shipped,
        };
        assert_eq!(req.path(), "/api/orders/orders/42/status/");
        assert_eq!(req.body().unwrap().unwrap(), r#"{"status":"SHIPPED"}"#);
        assert!(req.form().is_none());
    }

    #[test]
    fn test_product_update_drops_server_fields() {
        let listed: Record = serde_json::from_value(json!({
            "id": 4,
            "name": "Chair",
            "price": "10.00",
            "category": 2,
            "image": "https://cdn.shop/chair.jpg",
            "created_at": "2024-06-01T10:00:00Z"
        }))
        .unwrap();
        let update = UpdateProductRequest {
            id: "4".into(),
            product: listed,
        };
        assert_eq!(update.path(), "/api/products/products/4/");

        let form = update.form().unwrap();
        let mut fields = form.fields;
        fields.sort();
        assert_eq!(
            fields,
            vec![
                ("category".to_string(), "2".to_string()),
                ("name".to_string(), "Chair".to_string()),
                ("price".to_string(), "10.00".to_string()),
            ]
        );
        assert_eq!(form.file_field, PRODUCT_IMAGE_FIELD);
    }

    #[test]
    fn test_get_has_no_body() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
        );
        let req = DailySalesRequest { range };
        assert!(req.body().unwrap().is_none());
        assert_eq!(req.query()[0], ("start_date", "2024-05-01".to_string()));
        assert!(CustomerInsightsRequest.query().is_empty());
    }

    #[test]
    fn test_product_page_tolerates_missing_results() {
        let page: ProductPage = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(page.results.is_empty());
    }
}
