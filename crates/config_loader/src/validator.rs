//! 配置校验模块
//!
//! 校验规则：
//! - radius_km / earth_radius_km > 0 且有限
//! - user_id 唯一, username 非空
//! - 坐标在合法范围内 (lat/lon 必须成对出现)
//! - contacts 引用的用户存在，且不能引用自身
//! - store.kind = file 时 path 必填

use std::collections::HashSet;

use contracts::{ContractError, GeoPoint, SafeRouteConfig, StoreKind};

/// 校验 SafeRouteConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &SafeRouteConfig) -> Result<(), ContractError> {
    validate_alert_policy(config)?;
    validate_user_ids(config)?;
    validate_user_locations(config)?;
    validate_contacts(config)?;
    validate_store(config)?;
    Ok(())
}

/// 校验告警半径
fn validate_alert_policy(config: &SafeRouteConfig) -> Result<(), ContractError> {
    let alert = &config.alert;
    if !alert.radius_km.is_finite() || alert.radius_km <= 0.0 {
        return Err(ContractError::config_validation(
            "alert.radius_km",
            format!("radius_km must be > 0, got {}", alert.radius_km),
        ));
    }
    if !alert.earth_radius_km.is_finite() || alert.earth_radius_km <= 0.0 {
        return Err(ContractError::config_validation(
            "alert.earth_radius_km",
            format!("earth_radius_km must be > 0, got {}", alert.earth_radius_km),
        ));
    }
    Ok(())
}

/// 校验 user_id 唯一性与 username
fn validate_user_ids(config: &SafeRouteConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for user in &config.users {
        if !seen.insert(user.id) {
            return Err(ContractError::config_validation(
                format!("users[id={}]", user.id),
                "duplicate user_id",
            ));
        }
        if user.username.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("users[id={}].username", user.id),
                "username cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验最后已知坐标
fn validate_user_locations(config: &SafeRouteConfig) -> Result<(), ContractError> {
    for user in &config.users {
        match (user.lat, user.lon) {
            (Some(lat), Some(lon)) => {
                GeoPoint::new(lat, lon).map_err(|e| {
                    ContractError::config_validation(
                        format!("users[id={}].lat/lon", user.id),
                        e.to_string(),
                    )
                })?;
            }
            (None, None) => {}
            _ => {
                return Err(ContractError::config_validation(
                    format!("users[id={}].lat/lon", user.id),
                    "lat and lon must be set together",
                ));
            }
        }
    }
    Ok(())
}

/// 校验联系人引用
fn validate_contacts(config: &SafeRouteConfig) -> Result<(), ContractError> {
    let all_ids: HashSet<_> = config.users.iter().map(|u| u.id).collect();

    for user in &config.users {
        for contact in &user.contacts {
            if *contact == user.id {
                return Err(ContractError::config_validation(
                    format!("users[id={}].contacts", user.id),
                    "user cannot list themselves as a contact",
                ));
            }
            if !all_ids.contains(contact) {
                return Err(ContractError::config_validation(
                    format!("users[id={}].contacts", user.id),
                    format!("contact {} not found in users", contact),
                ));
            }
        }
    }
    Ok(())
}

/// 校验存储配置
fn validate_store(config: &SafeRouteConfig) -> Result<(), ContractError> {
    if config.store.kind == StoreKind::File {
        let missing = config
            .store
            .path
            .as_ref()
            .is_none_or(|p| p.as_os_str().is_empty());
        if missing {
            return Err(ContractError::config_validation(
                "store.path",
                "path is required when store.kind = \"file\"",
            ));
        }
    }
    Ok(())
}
