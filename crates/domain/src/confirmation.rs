//! # 確認ハッシュ
//!
//! 送信完了ページの URL に埋め込むハッシュを計算する。
//!
//! URL は `/sent/{id}/{hash}/` の形式で、`id` だけを書き換えて他人の共有記録を
//! 閲覧できないよう、送信者・宛先・メッセージ・サーバーシークレットから
//! 計算したハッシュを付与する。
//!
//! 改ざん検知のための署名ではなく推測の抑止が目的のため、
//! 非暗号学的ハッシュ（XXH64）を使用する。
//!
//! ## エンコード
//!
//! 各要素は「UTF-8 バイト長（u64 リトルエンディアン）+ バイト列」として
//! 順に投入する。区切り位置がずれた入力（`"ab" + "c"` と `"a" + "bc"`）は
//! 異なるハッシュになる。

use std::hash::Hasher;

use twox_hash::XxHash64;

const SEED: u64 = 0;

/// 確認ハッシュを計算する
///
/// プロセスやリリースをまたいで同じ入力に同じ値を返す。
///
/// ```rust
/// use emailshare_domain::confirmation::confirmation_hash;
///
/// let a = confirmation_hash("s@example.com", "r@example.com", "hi", "secret");
/// let b = confirmation_hash("s@example.com", "r@example.com", "hi", "secret");
/// assert_eq!(a, b);
/// ```
pub fn confirmation_hash(sender: &str, recipient: &str, message: &str, secret: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(SEED);
    for part in [sender, recipient, message, secret] {
        hasher.write(&(part.len() as u64).to_le_bytes());
        hasher.write(part.as_bytes());
    }
    hasher.finish()
}
