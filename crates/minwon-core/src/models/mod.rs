//! MINWON 텔레메트리 도메인 모델.
//!
//! 수집기(서버)와 공유하는 와이어 구조체와 모니터 리포트 구조체를 정의한다.
//! 와이어 모델의 타임스탬프는 수집기 계약에 따라 epoch 밀리초로 직렬화된다.

pub mod event;
pub mod report;
pub mod status;
