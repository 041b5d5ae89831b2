// ABOUTME: list sorting and source-position utilities shared by the parser and builtins.

use crate::value::Value;

pub type Comparer = fn(&Value, &Value) -> std::cmp::Ordering;

/// Quicksort by comparator, mirroring the three-way (smaller/equal/larger)
/// partition the reference implementation uses instead of an in-place sort.
pub fn sort(data: &[Value], compare: Comparer) -> Vec<Value> {
    if data.len() < 2 {
        return data.to_vec();
    }
    let pivot = data[0].clone();
    let mut smaller = Vec::new();
    let mut equal = vec![pivot.clone()];
    let mut larger = Vec::new();
    for item in &data[1..] {
        match compare(item, &pivot) {
            std::cmp::Ordering::Greater => larger.push(item.clone()),
            std::cmp::Ordering::Less => smaller.push(item.clone()),
            std::cmp::Ordering::Equal => equal.push(item.clone()),
        }
    }
    let mut result = sort(&smaller, compare);
    result.extend(equal);
    result.extend(sort(&larger, compare));
    result
}

pub fn sort_strings(data: &[Value]) -> Vec<Value> {
    sort(data, |a, b| a.to_string().cmp(&b.to_string()))
}

#[derive(Debug, Clone, Copy)]
pub struct LineInfo {
    pub line: usize,
    pub from: usize,
    pub to: usize,
}

/// Maps byte offsets in a source string to 1-based line / 0-based column
/// pairs, for rendering parse-error locations.
pub struct LineIndex(Vec<LineInfo>);

impl LineIndex {
    pub fn new(input: &str) -> Self {
        let mut res = Vec::new();
        let mut line = 0;
        let mut last = 0;
        let mut index = 0;
        for ch in input.chars() {
            if ch == '\n' {
                line += 1;
                res.push(LineInfo {
                    line,
                    from: last,
                    to: index,
                });
                last = index;
            }
            index += ch.len_utf8();
        }
        res.push(LineInfo {
            line,
            from: last,
            to: index,
        });
        LineIndex(res)
    }

    pub fn lookup(&self, index: i64) -> Option<(usize, usize)> {
        for info in &self.0 {
            if index >= info.from as i64 && index < info.to as i64 {
                return Some((info.line, (index - info.from as i64) as usize));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_strings_orders_lexicographically() {
        let data = vec![Value::string("banana"), Value::string("apple"), Value::string("cherry")];
        let sorted = sort_strings(&data);
        let names: Vec<String> = sorted.iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn sort_is_stable_for_equal_elements() {
        let data = vec![Value::Int(3), Value::Int(1), Value::Int(3), Value::Int(2)];
        let sorted = sort(&data, |a, b| {
            let (Value::Int(x), Value::Int(y)) = (a, b) else {
                unreachable!()
            };
            x.cmp(y)
        });
        let nums: Vec<i64> = sorted
            .iter()
            .map(|v| match v {
                Value::Int(n) => *n,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(nums, vec![1, 2, 3, 3]);
    }

    #[test]
    fn line_index_finds_line_and_column() {
        let idx = LineIndex::new("ab\ncd\nef");
        assert_eq!(idx.lookup(0), Some((0, 0)));
        assert_eq!(idx.lookup(3), Some((1, 0)));
        assert_eq!(idx.lookup(7), Some((2, 1)));
    }
}
