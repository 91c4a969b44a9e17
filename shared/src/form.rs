//! 表单校验辅助
//!
//! 请求体上的 `validator` 规则会用到这里的自定义函数；
//! 页面只展示第一条错误信息。

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// 去除首尾空白后不能为空
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// 取出第一条可展示的错误信息（按字段名排序，保证稳定）
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    return err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => return first_message(inner),
            ValidationErrorsKind::List(items) => {
                if let Some((_, inner)) = items.iter().next() {
                    return first_message(inner);
                }
            }
        }
    }
    "Invalid input".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Draft {
        #[validate(custom(function = "not_blank", message = "Please enter a title"))]
        title: String,
        #[validate(email(message = "Please enter a valid email"))]
        email: String,
    }

    #[test]
    fn test_first_message_uses_attribute_message() {
        let draft = Draft {
            title: "   ".into(),
            email: "ok@example.com".into(),
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(first_message(&errors), "Please enter a title");
    }

    #[test]
    fn test_first_message_is_stable_across_fields() {
        let draft = Draft {
            title: "".into(),
            email: "broken".into(),
        };
        let errors = draft.validate().unwrap_err();
        // "email" < "title"
        assert_eq!(first_message(&errors), "Please enter a valid email");
    }
}
