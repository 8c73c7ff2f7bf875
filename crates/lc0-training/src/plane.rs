//! 入力平面（8x8 ビットボード）の16進表現
//!
//! 1平面は64bitのマスクで、テキスト形式では16桁の16進文字列（ビッグエンディアン）になる。
//! ビット `r*8+f` が段 `r`・筋 `f` のマスに対応する（どちらも0始まり）。
//!
//! 16進文字列の2文字が1段分のバイトなので、2文字単位で並びを反転すると
//! 盤を上下反転した平面になる。

use crate::error::FormatError;

/// 平面の16進文字数
pub const PLANE_HEX_LEN: usize = 16;

/// 空の平面
pub const PLANE_EMPTY: u64 = 0;

/// 全マスが立っている平面
pub const PLANE_FULL: u64 = u64::MAX;

/// 段・筋の数
pub const BOARD_SIZE: usize = 8;

/// マス数
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// 段 `rank`・筋 `file` のマスのビット
#[inline]
pub const fn square_bit(rank: usize, file: usize) -> u64 {
    1u64 << (rank * BOARD_SIZE + file)
}

/// マスが立っているか
#[inline]
pub const fn is_set(mask: u64, rank: usize, file: usize) -> bool {
    mask & square_bit(rank, file) != 0
}

/// 16進文字列を平面マスクに変換する
pub fn decode_plane(hex: &str) -> Result<u64, FormatError> {
    if hex.len() != PLANE_HEX_LEN {
        return Err(FormatError::PlaneLength {
            len: hex.len(),
            text: hex.to_string(),
        });
    }
    // from_str_radix は先頭の '+' を受け付けるので事前に弾く
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FormatError::PlaneHex {
            text: hex.to_string(),
        });
    }
    u64::from_str_radix(hex, 16).map_err(|_| FormatError::PlaneHex {
        text: hex.to_string(),
    })
}

/// 平面マスクを16桁の小文字16進文字列に変換する
pub fn encode_plane(mask: u64) -> String {
    format!("{mask:016x}")
}

/// 平面を上下反転する（段の並びを逆にする）
#[inline]
pub const fn mirror_vertical(mask: u64) -> u64 {
    mask.swap_bytes()
}

/// 16進文字列のまま平面を上下反転する
///
/// 2文字（1バイト）単位で並びを反転する。バイト内のビット順は変えない。
/// 文字の大小は保持する。
pub fn flip_plane_vertically(hex: &str) -> Result<String, FormatError> {
    decode_plane(hex)?;
    let bytes = hex.as_bytes();
    let mut out = String::with_capacity(PLANE_HEX_LEN);
    for pair in bytes.chunks_exact(2).rev() {
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plane_bit_layout() {
        assert_eq!(decode_plane("0000000000000001").unwrap(), square_bit(0, 0));
        assert_eq!(decode_plane("0000000000000002").unwrap(), square_bit(0, 1));
        assert_eq!(decode_plane("8000000000000000").unwrap(), square_bit(7, 7));
        assert_eq!(decode_plane("ffffffffffffffff").unwrap(), PLANE_FULL);
        assert_eq!(decode_plane("FFFFFFFFFFFFFFFF").unwrap(), PLANE_FULL);
    }

    #[test]
    fn test_decode_plane_rejects_bad_input() {
        assert!(matches!(decode_plane("123"), Err(FormatError::PlaneLength { len: 3, .. })));
        assert!(matches!(
            decode_plane("00000000000000000"),
            Err(FormatError::PlaneLength { len: 17, .. })
        ));
        assert!(matches!(decode_plane("000000000000000g"), Err(FormatError::PlaneHex { .. })));
        assert!(matches!(decode_plane("+000000000000001"), Err(FormatError::PlaneHex { .. })));
        assert!(matches!(decode_plane("                "), Err(FormatError::PlaneHex { .. })));
    }

    #[test]
    fn test_decode_encode_round_trip() {
        for hex in [
            "0000000000000000",
            "ffffffffffffffff",
            "00ff00000000ff00",
            "8100000000000081",
            "0123456789abcdef",
            "fedcba9876543210",
        ] {
            assert_eq!(encode_plane(decode_plane(hex).unwrap()), hex);
        }
        // 1ビットずつ全マス
        for sq in 0..NUM_SQUARES {
            let hex = encode_plane(1u64 << sq);
            assert_eq!(decode_plane(&hex).unwrap(), 1u64 << sq);
        }
    }

    #[test]
    fn test_flip_plane_vertically_reverses_byte_groups() {
        assert_eq!(flip_plane_vertically("0123456789abcdef").unwrap(), "efcdab8967452301");
        assert_eq!(flip_plane_vertically("0000000000000002").unwrap(), "0200000000000000");
        assert_eq!(flip_plane_vertically("00000000000000AB").unwrap(), "AB00000000000000");
        assert!(flip_plane_vertically("xyz").is_err());
    }

    #[test]
    fn test_flip_plane_vertically_is_involution() {
        for hex in ["0123456789abcdef", "ff00000000000000", "0000000000000000", "00ff00ff00ff00ff"]
        {
            let once = flip_plane_vertically(hex).unwrap();
            assert_eq!(flip_plane_vertically(&once).unwrap(), hex);
        }
    }

    #[test]
    fn test_mirror_vertical_matches_text_flip() {
        for sq in 0..NUM_SQUARES {
            let mask = 1u64 << sq;
            let flipped = flip_plane_vertically(&encode_plane(mask)).unwrap();
            assert_eq!(decode_plane(&flipped).unwrap(), mirror_vertical(mask));
        }
        // 段 r → 段 7-r、筋はそのまま
        assert_eq!(mirror_vertical(square_bit(0, 1)), square_bit(7, 1));
        assert_eq!(mirror_vertical(square_bit(2, 5)), square_bit(5, 5));
    }

    use proptest::prelude::*;

    /// `case` のビットが立っている桁だけ大文字にした16進表記
    fn mixed_case_hex(mask: u64, case: u16) -> String {
        encode_plane(mask)
            .chars()
            .enumerate()
            .map(|(i, c)| if (case >> i) & 1 == 1 { c.to_ascii_uppercase() } else { c })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_decode_encode_round_trip(mask in any::<u64>(), case in any::<u16>()) {
            let hex = mixed_case_hex(mask, case);
            let decoded = decode_plane(&hex).unwrap();
            prop_assert_eq!(decoded, mask);
            prop_assert_eq!(encode_plane(decoded), hex.to_ascii_lowercase());
        }

        #[test]
        fn prop_flip_plane_vertically_is_involution(mask in any::<u64>(), case in any::<u16>()) {
            let hex = mixed_case_hex(mask, case);
            let once = flip_plane_vertically(&hex).unwrap();
            prop_assert_eq!(flip_plane_vertically(&once).unwrap(), hex);
        }

        #[test]
        fn prop_mirror_vertical_matches_text_flip(mask in any::<u64>(), case in any::<u16>()) {
            let flipped = flip_plane_vertically(&mixed_case_hex(mask, case)).unwrap();
            prop_assert_eq!(decode_plane(&flipped).unwrap(), mirror_vertical(mask));
            prop_assert_eq!(mirror_vertical(mirror_vertical(mask)), mask);
        }
    }
}
