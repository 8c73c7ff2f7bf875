//! 教師信号（方策確率と勝敗）

use crate::error::FormatError;

/// 教師信号の行数（方策・勝敗）
pub const NUM_OUTPUTS: usize = 2;

/// 方策の出力数
pub const NUM_POLICY: usize = 1924;

/// 方策確率の行を読む
///
/// 空白区切りの `NUM_POLICY` 個の浮動小数。
pub fn parse_policy_line(line: &str) -> Result<Vec<f32>, FormatError> {
    let mut probs = Vec::with_capacity(NUM_POLICY);
    for (index, token) in line.split_whitespace().enumerate() {
        let p = token.parse::<f32>().map_err(|_| FormatError::PolicyValue {
            index,
            text: token.to_string(),
        })?;
        probs.push(p);
    }
    if probs.len() != NUM_POLICY {
        return Err(FormatError::PolicyLength {
            expected: NUM_POLICY,
            actual: probs.len(),
        });
    }
    Ok(probs)
}

/// 方策確率をテキスト1行にする
pub fn format_policy_line(probs: &[f32]) -> String {
    let mut out = String::with_capacity(probs.len() * 4);
    for (i, p) in probs.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&p.to_string());
    }
    out
}

/// 勝敗の行を読む（手番側から見て 1=勝ち, 0=引分, -1=負け）
pub fn parse_result_line(line: &str) -> Result<i8, FormatError> {
    match line.trim().parse::<i8>() {
        Ok(v @ -1..=1) => Ok(v),
        _ => Err(FormatError::GameResult {
            text: line.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_line() -> String {
        vec!["0"; NUM_POLICY].join(" ")
    }

    #[test]
    fn test_parse_policy_line() {
        let mut tokens = vec!["0".to_string(); NUM_POLICY];
        tokens[5] = "0.25".to_string();
        tokens[NUM_POLICY - 1] = "0.75".to_string();
        let probs = parse_policy_line(&tokens.join(" ")).unwrap();
        assert_eq!(probs.len(), NUM_POLICY);
        assert_eq!(probs[5], 0.25);
        assert_eq!(probs[NUM_POLICY - 1], 0.75);
        assert!(parse_policy_line(&uniform_line()).is_ok());
    }

    #[test]
    fn test_parse_policy_line_errors() {
        assert_eq!(
            parse_policy_line("0.5 0.5").unwrap_err(),
            FormatError::PolicyLength {
                expected: NUM_POLICY,
                actual: 2
            }
        );
        assert!(matches!(
            parse_policy_line("0.5 abc"),
            Err(FormatError::PolicyValue { index: 1, .. })
        ));
    }

    #[test]
    fn test_format_policy_line_round_trip() {
        let mut probs = vec![0.0f32; NUM_POLICY];
        probs[10] = 0.125;
        let line = format_policy_line(&probs);
        assert_eq!(parse_policy_line(&line).unwrap(), probs);
    }

    #[test]
    fn test_parse_result_line() {
        assert_eq!(parse_result_line("1").unwrap(), 1);
        assert_eq!(parse_result_line(" -1 ").unwrap(), -1);
        assert_eq!(parse_result_line("0").unwrap(), 0);
        assert!(parse_result_line("2").is_err());
        assert!(parse_result_line("win").is_err());
    }
}
