//! Encrypt / decrypt the columns listed in [`orders::SENSITIVE_COLUMNS`].

use sea_orm::{ActiveModelTrait, ActiveValue, ModelTrait, Value};

use crate::entities::order_entity as orders;
use crate::error::AppResult;
use crate::utils::FieldCipher;

/// Replace every set, non-empty sensitive value with its ciphertext.
///
/// Empty strings are stored as NULL and never reach the cipher.
pub fn encrypt_sensitive(
    active: &mut orders::ActiveModel,
    cipher: &dyn FieldCipher,
) -> AppResult<()> {
    for column in orders::SENSITIVE_COLUMNS {
        if let ActiveValue::Set(Value::String(Some(plain))) = active.get(column) {
            let stored = if plain.is_empty() {
                Value::String(None)
            } else {
                cipher.encrypt(&plain)?.into()
            };
            active.set(column, stored);
        }
    }
    Ok(())
}

/// Decrypt the sensitive columns of a row read back from the store.
pub fn decrypt_sensitive(
    mut model: orders::Model,
    cipher: &dyn FieldCipher,
) -> AppResult<orders::Model> {
    for column in orders::SENSITIVE_COLUMNS {
        if let Value::String(Some(sealed)) = model.get(column) {
            if !sealed.is_empty() {
                model.set(column, cipher.decrypt(&sealed)?.into());
            }
        }
    }
    Ok(model)
}
