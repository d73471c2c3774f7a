//! # Progress Signal
//!
//! 見かけ上の進捗（経過時間の純関数）と実際の完了の突き合わせ
//!
//! 進捗は実際の転送量ではなく、一定間隔ごとに一定量増える近似値。
//! 終端の結果が届くまでは 99 で頭打ちになり、成功で 100、失敗でその時点の値に固定される。
//! タイマーを持たないため、どの終了経路でも後始末は不要。

use std::time::{Duration, Instant};

/// 終端結果が届くまでの上限
pub const PROGRESS_CAP: u8 = 99;

/// 完了時の値
pub const PROGRESS_DONE: u8 = 100;

/// 進捗の刻み設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressConfig {
    /// 1刻みあたりの増分（%）
    pub step: u8,
    /// 刻みの間隔
    pub interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            step: 10,
            interval: Duration::from_millis(300),
        }
    }
}

/// 経過時間から進捗を計算する
pub fn progress_after(elapsed: Duration, config: &ProgressConfig) -> u8 {
    let interval_ms = config.interval.as_millis();
    if interval_ms == 0 {
        return PROGRESS_CAP;
    }

    let ticks = elapsed.as_millis() / interval_ms;
    let value = ticks.saturating_mul(u128::from(config.step));
    value.min(u128::from(PROGRESS_CAP)) as u8
}

/// 1回の処理に紐づく進捗シグナル
#[derive(Debug, Clone, Copy)]
pub struct ProgressSignal {
    started_at: Instant,
    config: ProgressConfig,
    settled: Option<u8>,
}

impl ProgressSignal {
    pub fn start(config: ProgressConfig, now: Instant) -> Self {
        Self {
            started_at: now,
            config,
            settled: None,
        }
    }

    /// 現在の進捗
    pub fn value_at(&self, now: Instant) -> u8 {
        match self.settled {
            Some(value) => value,
            None => progress_after(now.saturating_duration_since(self.started_at), &self.config),
        }
    }

    /// 成功: 100 に確定
    pub fn complete(&mut self) {
        self.settled = Some(PROGRESS_DONE);
    }

    /// 失敗: 現在値で固定
    pub fn freeze(&mut self, now: Instant) {
        if self.settled.is_none() {
            self.settled = Some(self.value_at(now));
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled.is_some()
    }
}
