// src/services/document_service.rs

use std::path::PathBuf;

use chrono::NaiveDate;
use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{
    common::error::AppError,
    models::property::PropertyType,
    services::case_service::NoticeParts,
};

/// Conteúdo da notificação, já resolvido em texto.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeDocument {
    pub title: String,
    pub issued_on: String,
    pub landlord: String,
    pub tenant: String,
    pub occupants: Vec<String>,
    pub property_address: String,
    pub jurisdiction: String,
    pub rent_owed: String,
    pub law_firm: Option<Vec<String>>,
    pub subsidy_notice: Option<String>,
    pub case_reference: String,
}

impl NoticeDocument {
    pub fn from_parts(parts: &NoticeParts, issued_on: NaiveDate) -> Self {
        let NoticeParts { case, property, tenant, landlord, law_firm } = parts;

        // Só imóvel residencial com inquilino subsidiado
        let subsidy_notice = (property.property_type == PropertyType::Residential && tenant.is_subsidized)
            .then(|| {
                let program = tenant.subsidy_type.as_deref().unwrap_or("a rental assistance program");
                format!(
                    "This tenancy is subsidized through {}. A copy of this notice must also be \
                     provided to the administering housing agency.",
                    program
                )
            });

        let law_firm = law_firm.as_ref().map(|firm| {
            let mut lines = vec![firm.name.clone()];
            lines.extend(firm.address.clone());
            lines.extend(firm.phone.clone());
            lines.extend(firm.email.clone());
            lines
        });

        let occupants = if tenant.occupants.is_empty() {
            vec![tenant.display_name()]
        } else {
            tenant.occupants.clone()
        };

        Self {
            title: "NOTICE OF INTENT TO FILE A COMPLAINT FOR FAILURE TO PAY RENT".into(),
            issued_on: issued_on.format("%B %-d, %Y").to_string(),
            landlord: landlord.full_name.clone(),
            tenant: tenant.display_name(),
            occupants,
            property_address: format!("{}, {}", property.address, property.city),
            jurisdiction: property.jurisdiction.clone(),
            rent_owed: format!("${:.2}", case.rent_owed_at_filing),
            law_firm,
            subsidy_notice,
            case_reference: case.id.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self { fonts_dir: fonts_dir.into() }
    }

    pub async fn render_notice_pdf(&self, parts: &NoticeParts, issued_on: NaiveDate) -> Result<Vec<u8>, AppError> {
        let notice = NoticeDocument::from_parts(parts, issued_on);
        let fonts_dir = self.fonts_dir.clone();

        // genpdf é síncrono e pesado
        tokio::task::spawn_blocking(move || render(&fonts_dir, &notice))
            .await
            .map_err(|e| anyhow::anyhow!("PDF rendering task failed: {}", e))?
    }
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

fn render(fonts_dir: &std::path::Path, notice: &NoticeDocument) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|_| AppError::FontNotFound(format!("Roboto font not found in {}", fonts_dir.display())))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(notice.title.clone());
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    let bold = style::Style::new().bold();

    // --- CABEÇALHO ---
    doc.push(elements::Paragraph::new(notice.title.clone()).styled(bold.with_font_size(14)));
    doc.push(elements::Paragraph::new(format!("Date: {}", notice.issued_on)));
    doc.push(elements::Break::new(1.5));

    // --- PARTES ---
    let mut parties = elements::TableLayout::new(vec![1, 3]);
    parties.set_cell_decorator(elements::FrameCellDecorator::new(false, false, false));
    let rows = [
        ("Landlord", notice.landlord.clone()),
        ("Tenant", notice.tenant.clone()),
        ("Premises", notice.property_address.clone()),
        ("Jurisdiction", notice.jurisdiction.clone()),
    ];
    for (label, value) in rows {
        parties
            .row()
            .element(elements::Paragraph::new(label).styled(bold))
            .element(elements::Paragraph::new(value))
            .push()
            .map_err(pdf_error)?;
    }
    doc.push(parties);
    doc.push(elements::Break::new(1.5));

    // --- CORPO ---
    doc.push(elements::Paragraph::new(format!(
        "You are hereby notified that rent in the amount of {} is past due for the premises above. \
         If the past-due rent is not paid, the landlord intends to file a complaint in the {} court \
         to recover possession of the premises.",
        notice.rent_owed, notice.jurisdiction
    )));
    doc.push(elements::Break::new(1));

    doc.push(elements::Paragraph::new("Occupants").styled(bold));
    for occupant in &notice.occupants {
        doc.push(elements::Paragraph::new(format!("- {}", occupant)));
    }

    if let Some(subsidy) = &notice.subsidy_notice {
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(subsidy.clone()).styled(style::Style::new().italic()));
    }

    if let Some(firm) = &notice.law_firm {
        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new("Counsel for the landlord").styled(bold));
        for line in firm {
            doc.push(elements::Paragraph::new(line.clone()));
        }
    }

    // --- REFERÊNCIA (QR CODE) ---
    doc.push(elements::Break::new(2));
    let code = QrCode::new(notice.case_reference.as_bytes()).map_err(pdf_error)?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
    let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
        .map_err(pdf_error)?
        .with_scale(genpdf::Scale::new(0.4, 0.4));
    doc.push(pdf_image);

    doc.push(
        elements::Paragraph::new(format!("Case reference: {}", notice.case_reference))
            .styled(style::Style::new().with_font_size(8)),
    );

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::admin::LawFirm,
        services::test_support::{draft_case_for, landlord_with_prices, property_in, tenant_at},
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn parts() -> NoticeParts {
        let landlord = landlord_with_prices(&[("Baltimore City", "150", true)], None);
        let property = property_in(&landlord, "Baltimore City");
        let tenant = tenant_at(&property);
        let case = draft_case_for(landlord.id, "150".parse().unwrap());
        NoticeParts { case, property, tenant, landlord, law_firm: None }
    }

    fn issued() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn notice_carries_parties_and_amounts() {
        let parts = parts();
        let notice = NoticeDocument::from_parts(&parts, issued());

        assert_eq!(notice.issued_on, "March 9, 2026");
        assert_eq!(notice.landlord, "Test Landlord");
        assert_eq!(notice.tenant, "John Doe");
        assert_eq!(notice.property_address, "1200 N Charles St, Baltimore");
        assert_eq!(notice.jurisdiction, "Baltimore City");
        assert_eq!(notice.rent_owed, "$1200.00");
        assert_eq!(notice.case_reference, parts.case.id.to_string());
        assert_eq!(notice.law_firm, None);
        assert_eq!(notice.subsidy_notice, None);
    }

    #[test]
    fn subsidy_paragraph_only_for_residential_subsidized_tenants() {
        let mut parts = parts();
        parts.tenant.is_subsidized = true;
        parts.tenant.subsidy_type = Some("Housing Choice Voucher".into());

        let notice = NoticeDocument::from_parts(&parts, issued());
        assert!(notice.subsidy_notice.unwrap().contains("Housing Choice Voucher"));

        parts.property.property_type = PropertyType::Commercial;
        assert_eq!(NoticeDocument::from_parts(&parts, issued()).subsidy_notice, None);
    }

    #[test]
    fn empty_occupant_list_addresses_all_occupants() {
        let mut parts = parts();
        parts.tenant.occupants.clear();

        let notice = NoticeDocument::from_parts(&parts, issued());
        assert_eq!(notice.tenant, "All Occupants");
        assert_eq!(notice.occupants, vec!["All Occupants".to_string()]);
    }

    #[test]
    fn law_firm_block_skips_missing_fields() {
        let mut parts = parts();
        parts.law_firm = Some(LawFirm {
            id: Uuid::new_v4(),
            name: "Doe & Partners LLC".into(),
            address: Some("10 Light St".into()),
            phone: None,
            email: Some("office@doe.law".into()),
            created_at: Utc::now(),
        });

        let notice = NoticeDocument::from_parts(&parts, issued());
        assert_eq!(
            notice.law_firm,
            Some(vec!["Doe & Partners LLC".into(), "10 Light St".into(), "office@doe.law".into()])
        );
    }

    #[tokio::test]
    async fn missing_fonts_are_reported() {
        let service = DocumentService::new("./no-such-fonts-dir");
        let err = service.render_notice_pdf(&parts(), issued()).await.unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
