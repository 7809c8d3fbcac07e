//! 動作 token 掃描與解析
//!
//! 格式：`<action>SET_FACT:<path>=<value></action>` 或 `<action>GET_FACT:<path></action>`，
//! 分隔符逐位元組比對。每個 token 獨立解析，錯誤只影響該 token。

use crate::core::ActionError;

pub const ACTION_OPEN: &str = "<action>";
pub const ACTION_CLOSE: &str = "</action>";
pub const SET_PREFIX: &str = "SET_FACT:";
pub const GET_PREFIX: &str = "GET_FACT:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Set,
    Get,
}

/// 已解析的動作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Set { path: String, value: String },
    Get { path: String },
}

/// 解析 token 內容；動詞不符時返回 None（token 保持原樣）
pub fn parse_body(body: &str, verb: Verb) -> Option<Result<Action, ActionError>> {
    match verb {
        Verb::Set => body.strip_prefix(SET_PREFIX).map(parse_set),
        Verb::Get => body.strip_prefix(GET_PREFIX).map(parse_get),
    }
}

fn parse_set(rest: &str) -> Result<Action, ActionError> {
    let Some((path, value)) = rest.split_once('=') else {
        let path = rest.trim();
        if path.is_empty() {
            return Err(ActionError::EmptyPath);
        }
        return Err(ActionError::MissingValue(path.to_string()));
    };
    let path = path.trim();
    if path.is_empty() {
        return Err(ActionError::EmptyPath);
    }
    Ok(Action::Set {
        path: path.to_string(),
        value: value.trim().to_string(),
    })
}

fn parse_get(rest: &str) -> Result<Action, ActionError> {
    let path = rest.trim();
    if path.is_empty() {
        return Err(ActionError::EmptyPath);
    }
    if path.contains('=') {
        return Err(ActionError::InvalidPath(path.to_string()));
    }
    Ok(Action::Get {
        path: path.to_string(),
    })
}

/// 由左至右替換指定動詞的每個 token；其他 token 與未閉合的 `<action>` 原樣保留
pub fn rewrite<F>(text: &str, verb: Verb, mut handle: F) -> String
where
    F: FnMut(Result<Action, ActionError>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(first_open) = rest.find(ACTION_OPEN) {
        let body_from = first_open + ACTION_OPEN.len();
        let Some(close_rel) = rest[body_from..].find(ACTION_CLOSE) else {
            break;
        };
        let close = body_from + close_rel;
        // 離結束標記最近的開始標記才是 token 起點
        let open = rest[..close].rfind(ACTION_OPEN).unwrap_or(first_open);
        let body = &rest[open + ACTION_OPEN.len()..close];
        let end = close + ACTION_CLOSE.len();

        out.push_str(&rest[..open]);
        match parse_body(body, verb) {
            Some(parsed) => out.push_str(&handle(parsed)),
            None => out.push_str(&rest[open..end]),
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, verb: Verb) -> (String, Vec<Result<Action, ActionError>>) {
        let mut seen = Vec::new();
        let out = rewrite(text, verb, |parsed| {
            seen.push(parsed);
            "#".to_string()
        });
        (out, seen)
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            parse_body("SET_FACT: /filingStatus = single ", Verb::Set),
            Some(Ok(Action::Set {
                path: "/filingStatus".into(),
                value: "single".into()
            }))
        );
        assert_eq!(
            parse_body("SET_FACT:/a=b=c", Verb::Set),
            Some(Ok(Action::Set {
                path: "/a".into(),
                value: "b=c".into()
            }))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_body("SET_FACT:/filingStatus", Verb::Set),
            Some(Err(ActionError::MissingValue("/filingStatus".into())))
        );
        assert_eq!(parse_body("SET_FACT:=x", Verb::Set), Some(Err(ActionError::EmptyPath)));
        assert_eq!(parse_body("GET_FACT:  ", Verb::Get), Some(Err(ActionError::EmptyPath)));
        assert_eq!(
            parse_body("GET_FACT:/a=b", Verb::Get),
            Some(Err(ActionError::InvalidPath("/a=b".into())))
        );
    }

    #[test]
    fn test_verb_mismatch_is_not_a_token() {
        assert_eq!(parse_body("GET_FACT:/a", Verb::Set), None);
        assert_eq!(parse_body(" SET_FACT:/a=b", Verb::Set), None);
        assert_eq!(parse_body("DELETE_FACT:/a", Verb::Get), None);
    }

    #[test]
    fn test_rewrite_only_touches_requested_verb() {
        let text = "a<action>SET_FACT:/x=1</action>b<action>GET_FACT:/x</action>c";
        let (out, seen) = collect(text, Verb::Set);
        assert_eq!(out, "a#b<action>GET_FACT:/x</action>c");
        assert_eq!(seen.len(), 1);

        let (out, seen) = collect(&out, Verb::Get);
        assert_eq!(out, "a#b#c");
        assert_eq!(seen, vec![Ok(Action::Get { path: "/x".into() })]);
    }

    #[test]
    fn test_rewrite_left_to_right() {
        let text = "<action>GET_FACT:/a</action><action>GET_FACT:/b</action><action>GET_FACT:/a</action>";
        let (_, seen) = collect(text, Verb::Get);
        let paths: Vec<String> = seen
            .into_iter()
            .map(|r| match r {
                Ok(Action::Get { path }) => path,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(paths, vec!["/a", "/b", "/a"]);
    }

    #[test]
    fn test_unterminated_token_kept() {
        let text = "x <action>GET_FACT:/a</action> y <action>GET_FACT:/b";
        let (out, seen) = collect(text, Verb::Get);
        assert_eq!(out, "x # y <action>GET_FACT:/b");
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_stray_open_tag_before_token() {
        let text = "<action>oops <action>GET_FACT:/a</action>";
        let (out, seen) = collect(text, Verb::Get);
        assert_eq!(out, "<action>oops #");
        assert_eq!(seen.len(), 1);
    }
}
