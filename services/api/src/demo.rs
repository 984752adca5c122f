use clap::Args;

use land_registry::config::AppConfig;
use land_registry::error::AppError;
use land_registry::workflows::applications::{
    CreateApplicationRequest, IdentityProvider, PartyDetails, PaymentRequest, RegistryRepository,
    ServiceDetail, StatusId, UploadDocumentRequest, VerificationStatus,
};

use crate::infra::{bootstrap_providers, guess_content_type, DEMO_CITIZEN_TOKEN, DEMO_OFFICER_TOKEN};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the officer review half of the walkthrough.
    #[arg(long)]
    pub(crate) skip_review: bool,
}

/// Console walkthrough of one land-transfer application: intake with a detail
/// record, a supporting document, the officer review path, and the audit
/// trail the journey leaves behind.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let providers = bootstrap_providers(&config.storage);
    let service = providers.service;

    let citizen = providers
        .identity
        .resolve_bearer(DEMO_CITIZEN_TOKEN)
        .map_err(demo_failure)?;
    let officer_user = providers
        .identity
        .resolve_bearer(DEMO_OFFICER_TOKEN)
        .map_err(demo_failure)?;

    println!("Land-registry portal demo");
    println!("=========================");

    let application = service
        .create_application(
            citizen,
            CreateApplicationRequest {
                service_id: service
                    .service_catalog()
                    .by_code("LT")
                    .expect("land transfer catalogued")
                    .id,
                reference_number: None,
                detail: Some(ServiceDetail::LandTransfer {
                    seller: PartyDetails {
                        full_name: "K. Wickrama".to_string(),
                        nic_number: Some("701122334V".to_string()),
                        email: None,
                        phone_number: None,
                    },
                    buyer: PartyDetails {
                        full_name: "Demo Citizen".to_string(),
                        nic_number: Some("900000000V".to_string()),
                        email: Some("citizen@demo.local".to_string()),
                        phone_number: None,
                    },
                    guarantor1_nic: None,
                    guarantor2_nic: None,
                }),
                documents: Vec::new(),
            },
        )
        .map_err(demo_failure)?;
    println!(
        "Lodged application {} ({}) for Land Transfer",
        application.id.0, application.reference_number
    );

    let file_name = "deed.pdf";
    let receipt = service
        .upload_document(
            citizen,
            application.id,
            UploadDocumentRequest {
                document_type: "deed".to_string(),
                file_name: file_name.to_string(),
                content_type: Some(guess_content_type(file_name)),
                bytes: b"%PDF-1.4 demo deed".to_vec(),
            },
        )
        .map_err(demo_failure)?;
    println!(
        "Uploaded {} as document {}{}",
        file_name,
        receipt.document.id.0,
        receipt
            .download_url
            .map(|url| format!(" ({url})"))
            .unwrap_or_default()
    );

    let payment = service
        .create_payment(
            citizen,
            PaymentRequest {
                application_id: application.id,
                amount_cents: 100_000,
                payment_method: "card".to_string(),
                transaction_reference: Some("TXN-DEMO-1".to_string()),
            },
        )
        .map_err(demo_failure)?;
    println!(
        "Recorded payment {} of {} cents ({})",
        payment.id.0,
        payment.amount_cents,
        payment.status.label()
    );

    if !args.skip_review {
        service
            .update_status(officer_user, application.id, StatusId(2), None)
            .map_err(demo_failure)?;
        service
            .verify_document(
                officer_user,
                receipt.document.id,
                VerificationStatus::Verified,
                Some("legible".to_string()),
            )
            .map_err(demo_failure)?;
        service
            .update_status(
                officer_user,
                application.id,
                StatusId(3),
                Some("all documents verified".to_string()),
            )
            .map_err(demo_failure)?;
        println!("Officer reviewed, verified the deed, and approved");
    }

    println!("\nAudit trail (newest first):");
    let logs = providers
        .repository
        .logs_for_application(application.id)
        .map_err(demo_failure)?;
    for log in logs {
        let actor = log
            .officer_id
            .map(|id| format!("officer {}", id.0))
            .unwrap_or_else(|| "citizen".to_string());
        println!(
            "  [{}] {} — {}{}",
            log.timestamp.format("%Y-%m-%d %H:%M:%S"),
            actor,
            log.action_taken,
            log.remarks
                .map(|remarks| format!(" ({remarks})"))
                .unwrap_or_default()
        );
    }

    Ok(())
}

fn demo_failure(err: impl std::fmt::Display) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        err.to_string(),
    ))
}
