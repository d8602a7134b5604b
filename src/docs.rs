// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catraca ---
        handlers::access::validate_access,
        handlers::access::list_access_logs,

        // --- Parceiros ---
        handlers::checkin::partner_checkin,
        handlers::checkin::list_checkins,

        // --- Assinatura ---
        handlers::subscription::get_subscription,
        handlers::subscription::init_subscription,
        handlers::subscription::simulate_subscription,
        handlers::subscription::payment_confirmed,

        // --- Diretórios ---
        handlers::directory::get_employee,
        handlers::directory::save_employee,
        handlers::directory::get_member,
        handlers::directory::save_member,
    ),
    components(
        schemas(
            // --- Access ---
            models::access::ActorKind,
            models::access::AccessOutcome,
            models::access::IdentificationMethod,
            models::access::AccessPayload,
            models::access::AccessResponse,
            models::access::AccessLogEntry,

            // --- Partners ---
            models::checkin::PartnerCheckin,
            models::checkin::PartnerCheckinPayload,
            models::checkin::CheckinResponse,

            // --- Subscription ---
            models::subscription::SubscriptionPlan,
            models::subscription::SubscriptionStatus,
            models::subscription::SubscriptionUiStatus,
            models::subscription::Subscription,
            models::subscription::SubscriptionOverview,
            models::subscription::PaymentConfirmedPayload,
            models::subscription::SimulateSubscriptionPayload,

            // --- Directory ---
            models::people::EmployeeRole,
            models::people::EmployeeStatus,
            models::people::MemberStatus,
            models::people::Employee,
            models::people::Member,
            models::people::UpsertEmployeePayload,
            models::people::UpsertMemberPayload,
        )
    ),
    tags(
        (name = "Access", description = "Catraca: validação de PIN e log de acessos"),
        (name = "Partners", description = "Check-in de parceiros (Gympass e afins)"),
        (name = "Subscription", description = "Assinatura da academia e status derivado"),
        (name = "Billing", description = "Ponte de pagamentos"),
        (name = "Directory", description = "Funcionários e alunos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
