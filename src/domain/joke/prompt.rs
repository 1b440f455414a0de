//! Joke Context - Prompt 构建与生成文本清理

/// 系统提示词
pub const SYSTEM_PROMPT: &str = "Ты - мастер юмора и анекдотов. Твоя задача - создавать короткие, смешные анекдоты в стиле классических русских анекдотов.

Правила:
1. Длина: 2-4 предложения
2. Стиль: естественный разговорный русский язык
3. Темы: повседневные ситуации, работа, учеба, семья, животные
4. Запрещено: оскорбления, политика, черный юмор, дискриминация
5. Юмор: легкий, понятный, с неожиданной развязкой

Пример хорошего анекдота:
\"Приходит программист в магазин и спрашивает:
- У вас есть батарейки?
- Есть.
- А без них можно?\"

Всегда старайся создать оригинальный и смешной анекдот!";

const REQUIREMENTS: &str = "Требования:
- Длина: 2-4 предложения
- Стиль: классический русский анекдот
- Без оскорблений, политики и черного юмора
- Естественный и смешной сюжет";

/// 用户提示词
pub fn user_prompt(theme: &str) -> String {
    let theme = theme.trim();
    if theme.is_empty() {
        format!("Напиши случайный смешной анекдот.\n{}", REQUIREMENTS)
    } else {
        format!(
            "Напиши смешной анекдот на тему \"{}\".\n{}",
            theme, REQUIREMENTS
        )
    }
}

/// 清理模型输出
///
/// - 行内连续空格/制表符合并为一个空格
/// - 每行去除首尾空白
/// - 三个及以上连续换行合并为一个空行
/// - 整体去除首尾空白
pub fn clean_joke_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;

    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_with_theme() {
        let prompt = user_prompt(" кошки ");
        assert!(prompt.starts_with("Напиши смешной анекдот на тему \"кошки\"."));
        assert!(prompt.contains("Требования:"));
    }

    #[test]
    fn test_user_prompt_without_theme() {
        assert!(user_prompt("").starts_with("Напиши случайный смешной анекдот."));
    }

    #[test]
    fn test_clean_joke_text() {
        let raw = "  Приходит   программист\tв магазин:  \n- Есть?\n\n\n\n- Нет.  \n";
        assert_eq!(
            clean_joke_text(raw),
            "Приходит программист в магазин:\n- Есть?\n\n- Нет."
        );
    }

    #[test]
    fn test_clean_empty_text() {
        assert_eq!(clean_joke_text(""), "");
        assert_eq!(clean_joke_text(" \n \n"), "");
    }
}
