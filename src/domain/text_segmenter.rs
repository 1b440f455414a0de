//! 文本分割器
//!
//! 将生成的长文本拆分为不超过消息长度上限的片段：
//! 优先在句末标点处断开，句子本身过长时退化为按单词断开，单词本身永远不会被拆开。
//!
//! 长度一律按字符（Unicode scalar）计算，而不是字节。

/// Telegram 单条消息的最大字符数
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4096;

/// 检查是否为句末标点
#[inline]
fn is_sentence_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 按句末标点切分为句子 token（不做合并）
///
/// 每个 token 由句子正文、连续的句末标点以及其后的空白组成。
/// 标点串只有在后面紧跟空白或到达文本末尾时才会切分，
/// 因此 `3.14`、`e.g.x` 这类单词保持完整。
fn split_sentences(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if !is_sentence_terminal(ch) {
            continue;
        }

        // 吞掉连续的标点（"?!", "..."）
        while let Some(&(_, next)) = chars.peek() {
            if !is_sentence_terminal(next) {
                break;
            }
            chars.next();
        }

        let followed_by_space = matches!(chars.peek(), Some(&(_, next)) if next.is_whitespace());
        if !followed_by_space {
            continue;
        }

        // 空白归属于当前 token
        let mut end = text.len();
        while let Some(&(idx, next)) = chars.peek() {
            if !next.is_whitespace() {
                end = idx;
                break;
            }
            chars.next();
        }

        tokens.push(&text[start..end]);
        start = end;
    }

    // 最后一个句末标点之后的剩余内容
    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// `buffer + next` 去除首尾空白后的字符数
///
/// 片段发出前总会被 trim，所以只有真正会被发送的字符才计入长度
fn joined_len(buffer: &str, next: &str) -> usize {
    let head = buffer.trim_start();
    if head.is_empty() {
        return char_len(next.trim());
    }

    let tail = next.trim_end();
    if tail.is_empty() {
        return char_len(head.trim_end());
    }

    char_len(head) + char_len(tail)
}

/// 片段累加器
struct ChunkBuffer {
    max_length: usize,
    current: String,
    chunks: Vec<String>,
}

impl ChunkBuffer {
    fn new(max_length: usize) -> Self {
        Self {
            max_length,
            current: String::new(),
            chunks: Vec::new(),
        }
    }

    /// 发出当前片段（trim 后为空则丢弃）
    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.current.clear();
    }

    /// 整句追加，放不下时先发出当前片段
    fn push_sentence(&mut self, sentence: &str) {
        if joined_len(&self.current, sentence) > self.max_length {
            self.flush();
        }
        self.current.push_str(sentence);
    }

    /// 过长的句子按单词追加，单词之间以单个空格连接
    fn push_words(&mut self, sentence: &str) {
        let kept = self.current.trim_end().len();
        self.current.truncate(kept);

        for word in sentence.split_whitespace() {
            let head = self.current.trim_start();
            if head.is_empty() {
                self.current.clear();
                self.current.push_str(word);
                continue;
            }

            if char_len(head) + 1 + char_len(word) <= self.max_length {
                self.current.push(' ');
                self.current.push_str(word);
            } else {
                self.flush();
                self.current.push_str(word);
            }
        }

        // 与下一个 token 分隔开
        self.current.push(' ');
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// 将文本分割为不超过 `max_length` 个字符的片段
///
/// 分割策略：
/// 1. 文本本身不超长时原样返回（不 trim，空字符串返回 `[""]`）
/// 2. 按句末标点切分为句子 token，尽量把多个句子合并进同一片段
/// 3. 单个句子超长时按单词切分
/// 4. 单个单词超长时不再拆分，整体作为一个片段发出（可能超过上限）
pub fn segment(text: &str, max_length: usize) -> Vec<String> {
    if char_len(text) <= max_length {
        return vec![text.to_string()];
    }

    let mut buffer = ChunkBuffer::new(max_length);
    for sentence in split_sentences(text) {
        if char_len(sentence.trim()) > max_length {
            buffer.push_words(sentence);
        } else {
            buffer.push_sentence(sentence);
        }
    }

    let chunks = buffer.finish();
    if chunks.is_empty() {
        // 纯空白文本：保证非空输入总有输出
        return vec![String::new()];
    }
    chunks
}
