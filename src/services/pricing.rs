// src/services/pricing.rs

use rust_decimal::Decimal;

use crate::{
    common::error::{AppError, PricingError},
    models::{auth::User, property::Property},
};

/// Desconto fixo para quem tem código de indicação: 5.00
pub const REFERRAL_DISCOUNT: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Único lugar onde o preço de um caso é calculado.
///
/// Jurisdição fora da tabela, ou com `unlocked = false`, não é comprável:
/// não existe preço padrão implícito.
pub fn resolve_price(user: &User, property: &Property) -> Result<Decimal, PricingError> {
    let entry = user
        .price_overrides
        .get(&property.jurisdiction)
        .ok_or(PricingError::NotConfigured)?;

    if !entry.unlocked {
        return Err(PricingError::NotEnabled);
    }

    let mut price = entry.price;
    if has_referral(user) {
        price -= REFERRAL_DISCOUNT;
    }

    Ok(price.max(Decimal::ZERO))
}

/// Como `resolve_price`, mas rejeita zero: preço zerado é erro de configuração.
pub fn chargeable_price(user: &User, property: &Property) -> Result<Decimal, AppError> {
    let price = resolve_price(user, property)?;
    ensure_chargeable(price)?;
    Ok(price)
}

pub fn ensure_chargeable(price: Decimal) -> Result<(), AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::InvalidPrice(price));
    }
    Ok(())
}

pub fn has_referral(user: &User) -> bool {
    user.referral_code.as_deref().is_some_and(|c| !c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{landlord_with_prices, property_in};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn unlocked_jurisdiction_charges_configured_price() {
        let user = landlord_with_prices(&[("Baltimore City", "150", true)], None);
        let property = property_in(&user, "Baltimore City");

        assert_eq!(resolve_price(&user, &property), Ok(dec("150.00")));
    }

    #[test]
    fn referral_code_subtracts_fixed_discount() {
        let user = landlord_with_prices(&[("Baltimore City", "150", true)], Some("FRIEND"));
        let property = property_in(&user, "Baltimore City");

        assert_eq!(resolve_price(&user, &property), Ok(dec("145.00")));
    }

    #[test]
    fn locked_jurisdiction_is_not_purchasable() {
        let user = landlord_with_prices(&[("Howard County", "150", false)], None);
        let property = property_in(&user, "Howard County");

        let err = resolve_price(&user, &property).unwrap_err();
        assert_eq!(err, PricingError::NotEnabled);
        assert_eq!(err.to_string(), "jurisdiction not enabled for this account");
    }

    #[test]
    fn missing_jurisdiction_has_no_default_price() {
        let user = landlord_with_prices(&[("Baltimore City", "150", true)], None);
        let property = property_in(&user, "Anne Arundel County");

        let err = resolve_price(&user, &property).unwrap_err();
        assert_eq!(err.to_string(), "pricing not configured for this jurisdiction");
    }

    #[test]
    fn discount_clamps_at_zero_and_zero_is_not_chargeable() {
        let user = landlord_with_prices(&[("Baltimore City", "3", true)], Some("FRIEND"));
        let property = property_in(&user, "Baltimore City");

        assert_eq!(resolve_price(&user, &property), Ok(Decimal::ZERO));
        assert!(matches!(
            chargeable_price(&user, &property),
            Err(AppError::InvalidPrice(p)) if p == Decimal::ZERO
        ));
    }

    #[test]
    fn blank_referral_code_gets_no_discount() {
        let user = landlord_with_prices(&[("Baltimore City", "150", true)], Some("  "));
        let property = property_in(&user, "Baltimore City");

        assert_eq!(resolve_price(&user, &property), Ok(dec("150")));
    }

    #[test]
    fn resolution_is_deterministic() {
        let user = landlord_with_prices(&[("Baltimore City", "150", true)], Some("FRIEND"));
        let property = property_in(&user, "Baltimore City");

        let first = resolve_price(&user, &property);
        let second = resolve_price(&user, &property);
        assert_eq!(first, second);
        assert_eq!(user.price_overrides.len(), 1);
    }
}
