//! Invoice handlers: filtered listing and admin CRUD.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::invoice::{Invoice, InvoiceStatus, InvoiceValidationError};
use crate::domain::ports::{InvoiceFilter, InvoiceOrderField, OrderDirection};
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, pagination_params};
use crate::inbound::http::{storage_error, ApiResult};
use pagination::{Page, PageInfo};

fn validation_error(error: InvoiceValidationError) -> Error {
    let field = match error {
        InvoiceValidationError::EmptyClient => "client",
        InvoiceValidationError::EmptyIndustry => "industry",
        InvoiceValidationError::NonPositiveHours => "totalHoursBilled",
        InvoiceValidationError::NonPositiveAmount => "amountBilledBAM",
    };
    field_error(field, error)
}

async fn load_invoice(state: &HttpState, id: Uuid) -> Result<Invoice, Error> {
    state
        .invoices
        .find_by_id(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("Invoice not found."))
}

/// Query parameters accepted by the invoice list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListQuery {
    /// Case-insensitive substring match on the client name.
    pub client: Option<String>,
    pub invoice_status: Option<InvoiceStatus>,
    pub order_by_field: Option<InvoiceOrderField>,
    pub order_direction: Option<OrderDirection>,
    pub page: Option<u32>,
    pub take: Option<u32>,
}

/// One page of invoices plus pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicesPage {
    pub page_info: PageInfo,
    pub invoices: Vec<Invoice>,
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(InvoiceListQuery),
    responses(
        (status = 200, description = "Matching invoices", body = InvoicesPage),
        (status = 400, description = "Invalid query", body = Error),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["invoices"],
    operation_id = "listInvoices"
)]
#[get("/invoices")]
pub async fn list_invoices(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<InvoiceListQuery>,
) -> ApiResult<web::Json<InvoicesPage>> {
    current_user(&state, &session).await?;
    let query = query.into_inner();
    let params = pagination_params(query.page, query.take)?;
    let filter = InvoiceFilter {
        client: query.client,
        invoice_status: query.invoice_status,
    };
    let order = query.order_by_field.zip(query.order_direction);

    let invoices = state
        .invoices
        .list(&filter, order)
        .await
        .map_err(storage_error)?;
    let page = Page::slice(invoices, params);
    Ok(web::Json(InvoicesPage {
        page_info: page.page_info,
        invoices: page.items,
    }))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{invoice_id}",
    params(("invoice_id" = Uuid, Path, description = "Invoice to fetch")),
    responses(
        (status = 200, description = "The invoice", body = Invoice),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown invoice", body = Error),
    ),
    tags = ["invoices"],
    operation_id = "getInvoice"
)]
#[get("/invoices/{invoice_id}")]
pub async fn get_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Invoice>> {
    current_user(&state, &session).await?;
    let invoice = load_invoice(&state, path.into_inner()).await?;
    Ok(web::Json(invoice))
}

/// New-invoice body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub client: String,
    pub industry: String,
    pub total_hours_billed: u32,
    #[serde(rename = "amountBilledBAM")]
    pub amount_billed_bam: f64,
    pub invoice_status: InvoiceStatus,
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = Invoice),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
    ),
    tags = ["invoices"],
    operation_id = "createInvoice"
)]
#[post("/invoices")]
pub async fn create_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateInvoiceRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "create invoices").await?;
    let payload = payload.into_inner();

    let invoice = Invoice {
        id: Uuid::new_v4(),
        client: payload.client,
        industry: payload.industry,
        total_hours_billed: payload.total_hours_billed,
        amount_billed_bam: payload.amount_billed_bam,
        invoice_status: payload.invoice_status,
    };
    invoice.validate().map_err(validation_error)?;

    state
        .invoices
        .create(&invoice)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::Created().json(invoice))
}

/// Partial update body. Absent fields keep their stored values.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    pub client: Option<String>,
    pub industry: Option<String>,
    pub total_hours_billed: Option<u32>,
    #[serde(rename = "amountBilledBAM")]
    pub amount_billed_bam: Option<f64>,
    pub invoice_status: Option<InvoiceStatus>,
}

#[utoipa::path(
    patch,
    path = "/api/invoices/{invoice_id}",
    params(("invoice_id" = Uuid, Path, description = "Invoice to update")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Updated invoice", body = Invoice),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown invoice", body = Error),
    ),
    tags = ["invoices"],
    operation_id = "updateInvoice"
)]
#[patch("/invoices/{invoice_id}")]
pub async fn update_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateInvoiceRequest>,
) -> ApiResult<web::Json<Invoice>> {
    require_admin(&state, &session, "update invoices").await?;
    let mut invoice = load_invoice(&state, path.into_inner()).await?;
    let payload = payload.into_inner();

    if let Some(client) = payload.client {
        invoice.client = client;
    }
    if let Some(industry) = payload.industry {
        invoice.industry = industry;
    }
    if let Some(total_hours_billed) = payload.total_hours_billed {
        invoice.total_hours_billed = total_hours_billed;
    }
    if let Some(amount_billed_bam) = payload.amount_billed_bam {
        invoice.amount_billed_bam = amount_billed_bam;
    }
    if let Some(invoice_status) = payload.invoice_status {
        invoice.invoice_status = invoice_status;
    }
    invoice.validate().map_err(validation_error)?;

    state
        .invoices
        .update(&invoice)
        .await
        .map_err(storage_error)?;
    Ok(web::Json(invoice))
}

#[utoipa::path(
    delete,
    path = "/api/invoices/{invoice_id}",
    params(("invoice_id" = Uuid, Path, description = "Invoice to delete")),
    responses(
        (status = 204, description = "Invoice removed"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown invoice", body = Error),
    ),
    tags = ["invoices"],
    operation_id = "deleteInvoice"
)]
#[delete("/invoices/{invoice_id}")]
pub async fn delete_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "delete invoices").await?;
    let invoice = load_invoice(&state, path.into_inner()).await?;
    state
        .invoices
        .delete(invoice.id)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{admin_session, guest_session, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    fn invoice_body(client: &str, amount: f64) -> Value {
        json!({
            "client": client,
            "industry": "Logistics",
            "totalHoursBilled": 160,
            "amountBilledBAM": amount,
            "invoiceStatus": "Sent",
        })
    }

    async fn create(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        body: Value,
    ) -> Value {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/invoices")
                .cookie(cookie.clone())
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn guests_cannot_create_invoices() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = guest_session(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/invoices")
                .cookie(cookie)
                .set_json(invoice_body("Globex", 14_400.0))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "This user is not allowed to create invoices."
        );
    }

    #[actix_web::test]
    async fn zero_hours_are_rejected() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let mut body = invoice_body("Globex", 14_400.0);
        body["totalHoursBilled"] = json!(0);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/invoices")
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json_body: Value = test::read_body_json(res).await;
        assert_eq!(json_body["details"]["field"], "totalHoursBilled");
    }

    #[actix_web::test]
    async fn list_filters_by_client_and_orders_by_amount() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        create(&app, &cookie, invoice_body("Globex", 14_400.0)).await;
        create(&app, &cookie, invoice_body("Initech", 9_600.0)).await;
        create(&app, &cookie, invoice_body("Globex Dach", 20_000.0)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/invoices?client=globex&orderByField=amountBilledBAM&orderDirection=asc")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let invoices = body["invoices"].as_array().expect("invoices array");
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0]["amountBilledBAM"], 14_400.0);
        assert_eq!(invoices[1]["amountBilledBAM"], 20_000.0);
        assert_eq!(body["pageInfo"]["total"], 2);
    }

    #[actix_web::test]
    async fn pagination_reports_page_bounds() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        for n in 0..5 {
            create(&app, &cookie, invoice_body(&format!("Client {n}"), 1_000.0)).await;
        }

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/invoices?page=2&take=2")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["pageInfo"]["total"], 5);
        assert_eq!(body["pageInfo"]["currentPage"], 2);
        assert_eq!(body["pageInfo"]["lastPage"], 3);
        assert_eq!(body["invoices"].as_array().expect("array").len(), 2);
    }

    #[actix_web::test]
    async fn update_changes_the_status() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let created = create(&app, &cookie, invoice_body("Globex", 14_400.0)).await;
        let id = created["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/invoices/{id}"))
                .cookie(cookie)
                .set_json(json!({ "invoiceStatus": "Paid" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["invoiceStatus"], "Paid");
        assert_eq!(body["client"], "Globex");
    }

    #[actix_web::test]
    async fn delete_removes_the_invoice() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let created = create(&app, &cookie, invoice_body("Globex", 14_400.0)).await;
        let id = created["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/invoices/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/invoices/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Invoice not found.");
    }
}
