use validator::ValidationError;

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
