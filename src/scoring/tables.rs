//! Lookup tables for the sal rules.
//!
//! Branch codes: 자1 축2 인3 묘4 진5 사6 오7 미8 신9 유10 술11 해12.
//! Stem codes: 갑1 을2 병3 정4 무5 기6 경7 신8 임9 계10.
//! Symmetric relations list both orders.

/// Wonjin (mutual resentment) between the day branch and another branch.
pub const RESENTMENT: &[(i64, i64)] = &[
    (1, 8),
    (8, 1),
    (2, 7),
    (7, 2),
    (3, 10),
    (10, 3),
    (4, 9),
    (9, 4),
    (5, 12),
    (12, 5),
    (6, 11),
    (11, 6),
];

/// Gwimun pairing between the year and month branches.
pub const GWIMUN: &[(i64, i64)] = &[
    (1, 10),
    (10, 1),
    (2, 7),
    (7, 2),
    (3, 8),
    (8, 3),
    (4, 9),
    (9, 4),
    (5, 12),
    (12, 5),
    (6, 11),
    (11, 6),
];

/// Pa (destruction).
pub const DESTRUCTION: &[(i64, i64)] = &[
    (1, 10),
    (10, 1),
    (2, 5),
    (5, 2),
    (3, 12),
    (12, 3),
    (4, 7),
    (7, 4),
    (6, 9),
    (9, 6),
    (8, 11),
    (11, 8),
];

/// Hae (harm).
pub const HARM: &[(i64, i64)] = &[
    (1, 8),
    (8, 1),
    (2, 7),
    (7, 2),
    (3, 6),
    (6, 3),
    (4, 5),
    (5, 4),
    (9, 12),
    (12, 9),
    (10, 11),
    (11, 10),
];

/// Baekho: (day stem, day branch) pillars.
pub const BAEKHO: &[(i64, i64)] = &[
    (1, 5),
    (2, 8),
    (3, 11),
    (4, 2),
    (5, 5),
    (9, 11),
    (10, 2),
];

/// Goegang: (stem, branch) pillars checked per position for women.
pub const GOEGANG: &[(i64, i64)] = &[(7, 5), (7, 11), (9, 5), (9, 11)];

/// Branches that punish themselves when repeated: 진 오 유 해.
pub const SELF_PUNISHING: &[i64] = &[5, 7, 10, 12];

/// Day branches that anchor a samhyeong, with the partners that complete it.
pub const SAMHYEONG: &[(i64, &[i64])] = &[(3, &[6, 9]), (7, &[2, 5, 7]), (2, &[7, 8, 11])];

pub fn contains(table: &[(i64, i64)], a: i64, b: i64) -> bool {
    table.iter().any(|&(x, y)| x == a && y == b)
}
