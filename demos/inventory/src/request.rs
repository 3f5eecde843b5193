//! 요청 본문 해석
//!
//! 이벤트의 `body`는 JSON 문자열입니다. 필드 값이 비어 있으면(누락, `null`,
//! `false`, `0`, 빈 문자열) 잘못된 요청으로 봅니다.

use serde_json::Value;

/// 재고 변경 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRequest {
    pub product: String,
    /// 요청에 적힌 그대로의 변경량 표기
    pub action: String,
    /// 정수로 해석한 변경량
    pub amount: i64,
    pub user: String,
}

impl InventoryRequest {
    /// 이벤트에서 요청을 꺼냅니다. 형식이 맞지 않으면 `None`.
    pub fn from_event(event: &Value) -> Option<Self> {
        let body: Value = serde_json::from_str(event.get("body")?.as_str()?).ok()?;
        let product = present(body.get("product"))?;
        let action = present(body.get("action"))?;
        let user = present(body.get("user"))?;
        let amount = leading_integer(action)?;

        Some(Self {
            product: text(product),
            action: text(action),
            amount,
            user: text(user),
        })
    }

    /// 로그 파일과 큐에 남기는 변경 내역
    pub fn change_message(&self) -> String {
        format!(
            "The user {} has changed {} with the action {}",
            self.user, self.product, self.action
        )
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    let value = value?;
    let empty = match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    };
    (!empty).then_some(value)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 앞쪽 공백 뒤의 부호와 숫자만 읽습니다. (`"20 units"` → 20)
fn leading_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}
