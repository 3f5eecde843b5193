//! 리소스 이름 검증 및 생성
//!
//! 각 리소스 종류는 순서가 있는 [`NamingRule`] 목록을 가집니다.
//! 명시적 이름은 첫 번째로 실패한 규칙과 함께 거부되고, 이름이 없으면
//! 해당 종류의 문자 집합에서 최대 길이로 무작위 생성한 뒤 모든 규칙을
//! 통과할 때까지 다시 생성합니다.

use rand::{Rng, thread_rng};
use stagehand_core::error::ProvisionError;
use stagehand_core::types::ResourceKind;

/// 이름 검증 규칙 하나
///
/// `check`는 후보 이름과 FIFO 여부를 받아 통과 여부를 반환합니다.
#[derive(Debug, Clone, Copy)]
pub struct NamingRule {
    /// 위반 시 보고되는 규칙 설명
    pub text: &'static str,
    /// 검사 함수
    pub check: fn(&str, bool) -> bool,
}

const BUCKET_POOL: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-.";
const TABLE_POOL: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-.";
const QUEUE_POOL: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-";

const BUCKET_MAX_LEN: usize = 63;
const TABLE_MAX_LEN: usize = 255;
const QUEUE_MAX_LEN: usize = 80;
const FIFO_SUFFIX: &str = ".fifo";

// ─── 규칙 정의 ────────────────────────────────────────────────────────

static BUCKET_RULES: [NamingRule; 7] = [
    NamingRule {
        text: "The bucket name can contain only lower-case characters, numbers, periods, and dashes.",
        check: |s, _| {
            !s.is_empty()
                && s.bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
        },
    },
    NamingRule {
        text: "The bucket name must start with a lowercase letter or number.",
        check: |s, _| {
            s.bytes()
                .next()
                .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        },
    },
    NamingRule {
        text: "The bucket name can't end with a dash",
        check: |s, _| !s.is_empty() && !s.ends_with('-'),
    },
    NamingRule {
        text: "The bucket name can't have consecutive periods",
        check: |s, _| !s.is_empty() && !s.contains(".."),
    },
    NamingRule {
        text: "The bucket name can't end with dash adjacent to period",
        check: |s, _| !s.is_empty() && !s.ends_with("-."),
    },
    NamingRule {
        text: "The bucket name can't be formatted as an IP address",
        check: |s, _| !s.is_empty() && !is_ipv4(s),
    },
    NamingRule {
        text: "The bucket name can be between 3 and 63 characters long.",
        check: |s, _| (3..=BUCKET_MAX_LEN).contains(&s.len()),
    },
];

static TABLE_RULES: [NamingRule; 2] = [
    NamingRule {
        text: "The dynamo table name can contain only upper/lower-case characters, numbers, periods, underscore and dashes.",
        check: |s, _| !s.is_empty() && s.bytes().all(|b| TABLE_POOL.contains(&b)),
    },
    NamingRule {
        text: "The dynamo table name can be between 3 and 255 characters long.",
        check: |s, _| (3..=TABLE_MAX_LEN).contains(&s.len()),
    },
];

static QUEUE_RULES: [NamingRule; 2] = [
    NamingRule {
        text: "The sqs queue name can contain only upper/lower-case characters, numbers, underscore and dashes. If the queue is a fifo it has to end with .fifo",
        check: |s, fifo| {
            let stem = if fifo {
                match s.strip_suffix(FIFO_SUFFIX) {
                    Some(stem) => stem,
                    None => return false,
                }
            } else {
                s
            };
            !s.is_empty() && stem.bytes().all(|b| QUEUE_POOL.contains(&b))
        },
    },
    NamingRule {
        text: "The sqs queue name must be between 1 and 80 characters long.",
        check: |s, _| (1..=QUEUE_MAX_LEN).contains(&s.len()),
    },
];

/// 네 개의 10진수 옥텟(0-255)으로 이루어진 IPv4 형식인지 검사합니다.
///
/// 세 자리 옥텟은 `1` 또는 `2`로 시작해야 합니다 (`099`는 옥텟이 아님).
fn is_ipv4(s: &str) -> bool {
    let octets: Vec<&str> = s.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            let digits_only = !octet.is_empty() && octet.bytes().all(|b| b.is_ascii_digit());
            digits_only
                && octet.len() <= 3
                && (octet.len() < 3 || matches!(octet.as_bytes()[0], b'1' | b'2'))
                && octet.parse::<u16>().is_ok_and(|v| v <= 255)
        })
}

/// 종류별 규칙 목록
pub fn rules(kind: ResourceKind) -> &'static [NamingRule] {
    match kind {
        ResourceKind::Bucket => &BUCKET_RULES,
        ResourceKind::Table => &TABLE_RULES,
        ResourceKind::Queue => &QUEUE_RULES,
    }
}

/// 생성 실패 시 출력되는 작업 위치 라벨
pub fn creation_location(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Bucket => "Error while creating Bucket:",
        ResourceKind::Table => "Dynamo db table creation",
        ResourceKind::Queue => "Error while creating sqs queue:",
    }
}

/// 첫 번째로 위반한 규칙을 반환합니다 (모두 통과하면 `None`).
pub fn first_violation(kind: ResourceKind, name: &str, fifo: bool) -> Option<&'static NamingRule> {
    rules(kind).iter().find(|rule| !(rule.check)(name, fifo))
}

/// 이름을 확정합니다.
///
/// - 명시적 이름: 검증 후 그대로 사용, 위반 시 [`ProvisionError::InvalidName`]
/// - 이름 없음: 무작위 생성 (모든 규칙 통과까지 재생성)
pub fn resolve_name(
    kind: ResourceKind,
    explicit: Option<&str>,
    fifo: bool,
) -> Result<String, ProvisionError> {
    match explicit {
        Some(name) => match first_violation(kind, name, fifo) {
            Some(rule) => Err(ProvisionError::InvalidName {
                location: creation_location(kind).to_owned(),
                rule: rule.text.to_owned(),
            }),
            None => Ok(name.to_owned()),
        },
        None => Ok(generate_name(kind, fifo)),
    }
}

/// 종류별 문자 집합에서 최대 길이의 유효한 이름을 생성합니다.
pub fn generate_name(kind: ResourceKind, fifo: bool) -> String {
    let fifo = fifo && kind == ResourceKind::Queue;
    let (pool, len) = match kind {
        ResourceKind::Bucket => (BUCKET_POOL, BUCKET_MAX_LEN),
        ResourceKind::Table => (TABLE_POOL, TABLE_MAX_LEN),
        ResourceKind::Queue if fifo => (QUEUE_POOL, QUEUE_MAX_LEN - FIFO_SUFFIX.len()),
        ResourceKind::Queue => (QUEUE_POOL, QUEUE_MAX_LEN),
    };

    let mut rng = thread_rng();
    loop {
        let mut name: String = (0..len)
            .map(|_| char::from(pool[rng.gen_range(0..pool.len())]))
            .collect();
        if fifo {
            name.push_str(FIFO_SUFFIX);
        }
        if first_violation(kind, &name, fifo).is_none() {
            return name;
        }
    }
}
