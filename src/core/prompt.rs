/// Built-in system prompt: a friendly sewing-machine project stylist that
/// answers in Korean.
pub const DEFAULT_SYSTEM_PROMPT: &str = "당신은 친근하고 창의적인 재봉틀 전문 스타일리스트입니다.
사용자의 요구사항(예: 기술 수준, 용도, 선호하는 스타일, 시간 제약 등)을 이해하고,
그에 맞춰 만들 수 있는 작품을 추천합니다.

당신의 역할:
1. 사용자의 요구사항을 친근하게 묻기
2. 구체적이고 실현 가능한 프로젝트 추천
3. 각 프로젝트의 난이도, 필요한 시간, 재료 등 설명
4. 초보자부터 숙련자까지 모든 수준의 사람들을 위한 조언 제공
5. 창의적인 아이디어와 응용 방법 제시
6. 친근하고 격려하는 톤 유지

항상 한국어로 응답하며, 구체적이고 도움이 되는 조언을 제공합니다.";

/// Holds the system prompt sent ahead of every request.
#[derive(Debug, Clone)]
pub struct PromptStore {
    current: String,
}

impl Default for PromptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptStore {
    pub fn new() -> Self {
        Self {
            current: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn get(&self) -> &str {
        &self.current
    }

    /// Replaces the prompt wholesale. Empty text is accepted.
    pub fn apply(&mut self, text: impl Into<String>) {
        self.current = text.into();
    }

    pub fn reset(&mut self) {
        self.current = DEFAULT_SYSTEM_PROMPT.to_string();
    }

    pub fn is_default(&self) -> bool {
        self.current == DEFAULT_SYSTEM_PROMPT
    }
}
