// ==========================================
// 商品目录迁移工具 - 种子数据阶段
// ==========================================
// 职责: 幂等创建两个运费区（本国 + 其余国家）、
//       固定地址与唯一仓库，并关联运费区
// 说明: 库存导入依赖此阶段产出的仓库 id
// ==========================================

use crate::domain::warehouse::Address;
use crate::importer::error::ImportResult;
use crate::importer::slug::slugify;
use crate::importer::{ImportContext, Stage};
use tracing::debug;

pub(crate) const STAGE: Stage = Stage {
    name: "seed",
    reads: &[],
    populates: &[],
    run,
};

/// ISO 3166-1 alpha-2 国家代码全集（外部参照数据，按字典序）
pub const COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
    "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
    "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
    "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
    "IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
    "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
    "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
    "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
    "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
    "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
    "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

fn run(ctx: &mut ImportContext) -> ImportResult<usize> {
    let seed = ctx.config.seed.clone();
    let home_country = ctx.config.home_country.as_str();

    // 本国运费区
    let home_zone =
        ctx.repos
            .warehouses
            .get_or_create_zone(&seed.home_zone_name, &[home_country], true)?;

    // 其余国家运费区（全集去掉本国）
    let world_countries: Vec<&str> = COUNTRY_CODES
        .iter()
        .copied()
        .filter(|code| *code != home_country)
        .collect();
    let world_zone =
        ctx.repos
            .warehouses
            .get_or_create_zone(&seed.world_zone_name, &world_countries, true)?;

    // 仓库地址
    let address = ctx.repos.warehouses.get_or_create_address(&Address {
        first_name: seed.contact_first_name.clone(),
        last_name: seed.contact_last_name.clone(),
        company_name: seed.company_name.clone(),
        street_address: seed.street_address.clone(),
        city: seed.city.clone(),
        postal_code: seed.postal_code.clone(),
        country: home_country.to_string(),
        phone: seed.phone.clone(),
    })?;

    // 仓库与运费区关联
    let warehouse = ctx.repos.warehouses.get_or_create_warehouse(
        &seed.warehouse_name,
        &slugify(&seed.warehouse_name),
        address.entity,
        &seed.warehouse_email,
    )?;
    ctx.repos
        .warehouses
        .link_zone(warehouse.entity.id, home_zone.entity.id)?;
    ctx.repos
        .warehouses
        .link_zone(warehouse.entity.id, world_zone.entity.id)?;

    debug!(
        warehouse_id = warehouse.entity.id,
        created = warehouse.created,
        "仓库种子数据已就绪"
    );

    ctx.warehouse_id = Some(warehouse.entity.id);

    let created = [home_zone.created, world_zone.created, warehouse.created]
        .iter()
        .filter(|c| **c)
        .count();
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_codes_contain_home_country_and_are_unique() {
        assert!(COUNTRY_CODES.contains(&"AT"));

        let mut sorted = COUNTRY_CODES.to_vec();
        sorted.dedup();
        assert_eq!(sorted.len(), COUNTRY_CODES.len());
    }
}
