use crate::{ParseError, Rule};
use lazyfield_core::{
    AccessFlags, Class, ClassBuilder, Constant, LabelId, Method, MethodBuilder, Opcode,
    OperandForm,
};
use pest::iterators::Pair;

enum Operand<'i> {
    Word(&'i str),
    Str(String),
}

impl<'i> Operand<'i> {
    fn word(&self) -> Option<&'i str> {
        match self {
            Operand::Word(word) => Some(word),
            Operand::Str(_) => None,
        }
    }
}

fn line_of(pair: &Pair<'_, Rule>) -> usize {
    pair.line_col().0
}

pub(crate) fn lower_class(pair: Pair<'_, Rule>) -> Result<Class, ParseError> {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
    let mut builder = ClassBuilder::new(name);

    for item in inner {
        match item.as_rule() {
            Rule::extends => {
                if let Some(super_name) = item.into_inner().next() {
                    builder.super_class(super_name.as_str());
                }
            }
            Rule::field_decl => {
                let (access, name, descriptor, _) = header(item);
                builder.field(name, descriptor, access);
            }
            Rule::method_decl => {
                let method = lower_method(&builder, item)?;
                builder.add_method(method);
            }
            _ => {}
        }
    }

    Ok(builder.build()?)
}

/// Access flags, name and descriptor of a field or method, plus whatever follows them.
fn header<'i>(pair: Pair<'i, Rule>) -> (AccessFlags, &'i str, &'i str, Vec<Pair<'i, Rule>>) {
    let mut access = AccessFlags::empty();
    let mut name = "";
    let mut descriptor = "";
    let mut rest = Vec::new();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::access => {
                if let Some(flag) = AccessFlags::from_keyword(part.as_str()) {
                    access = access | flag;
                }
            }
            Rule::name => name = part.as_str(),
            Rule::descriptor => descriptor = part.as_str(),
            _ => rest.push(part),
        }
    }
    (access, name, descriptor, rest)
}

fn lower_method(class: &ClassBuilder, pair: Pair<'_, Rule>) -> Result<Method, ParseError> {
    let (access, name, descriptor, body) = header(pair);
    let mut method = class.method(name, descriptor, access);

    for item in body {
        let line = line_of(&item);
        match item.as_rule() {
            Rule::label_def => {
                let label = item.into_inner().next().map(|p| p.as_str()).unwrap_or_default();
                method.place(parse_label(label, line)?);
            }
            Rule::line_decl => {
                let mut parts = item.into_inner();
                let number = parts.next().map(|p| p.as_str()).unwrap_or_default();
                let label = parts.next().map(|p| p.as_str()).unwrap_or_default();
                let number = number.parse().map_err(|_| ParseError::Operand {
                    line,
                    message: format!("invalid line number `{}`", number),
                })?;
                method.line(number, parse_label(label, line)?);
            }
            Rule::catch_decl => {
                let parts: Vec<&str> = item.into_inner().map(|p| p.as_str()).collect();
                let [start, end, handler, rest @ ..] = parts.as_slice() else {
                    return Err(ParseError::Operand {
                        line,
                        message: "catch needs start, end and handler labels".to_string(),
                    });
                };
                method.try_catch(
                    parse_label(start, line)?,
                    parse_label(end, line)?,
                    parse_label(handler, line)?,
                    rest.first().copied(),
                );
            }
            Rule::instruction => lower_instruction(&mut method, item)?,
            _ => {}
        }
    }

    Ok(method.build()?)
}

fn lower_instruction(method: &mut MethodBuilder, pair: Pair<'_, Rule>) -> Result<(), ParseError> {
    let line = line_of(&pair);
    let mut parts = pair.into_inner();
    let mnemonic = parts.next().map(|p| p.as_str()).unwrap_or_default();
    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| ParseError::UnknownOpcode {
        line,
        mnemonic: mnemonic.to_string(),
    })?;
    let operands: Vec<Operand<'_>> = parts
        .map(|p| match p.as_rule() {
            Rule::string => Ok(Operand::Str(unescape(
                p.into_inner().next().map(|c| c.as_str()).unwrap_or_default(),
                line,
            )?)),
            _ => Ok(Operand::Word(p.as_str())),
        })
        .collect::<Result<_, ParseError>>()?;

    let operand_error = |message: String| ParseError::Operand {
        line,
        message: format!("{}: {}", mnemonic, message),
    };
    let words = |count: usize| {
        let words: Vec<&str> = operands.iter().filter_map(Operand::word).collect();
        if words.len() != operands.len() || words.len() != count {
            return Err(operand_error(format!("expected {} operands", count)));
        }
        Ok(words)
    };

    match opcode.form() {
        OperandForm::Simple => {
            words(0)?;
            method.op(opcode);
        }
        OperandForm::Int => {
            let w = words(1)?;
            method.int(opcode, parse_number(w[0], line)?);
        }
        OperandForm::Var => {
            let w = words(1)?;
            method.var(opcode, parse_number(w[0], line)?);
        }
        OperandForm::Iinc => {
            let w = words(2)?;
            method.iinc(parse_number(w[0], line)?, parse_number(w[1], line)?);
        }
        OperandForm::Type => {
            let w = words(1)?;
            method.type_insn(opcode, w[0]);
        }
        OperandForm::Field | OperandForm::Method => {
            let w = words(2)?;
            let (owner, name) = w[0]
                .rsplit_once('.')
                .ok_or_else(|| operand_error(format!("expected Owner.name, got `{}`", w[0])))?;
            if opcode.form() == OperandForm::Field {
                method.field(opcode, owner, name, w[1]);
            } else {
                method.invoke(opcode, owner, name, w[1]);
            }
        }
        OperandForm::InvokeDynamic => {
            let w = words(2)?;
            method.invoke_dynamic(w[0], w[1]);
        }
        OperandForm::Jump => {
            let w = words(1)?;
            method.jump(opcode, parse_label(w[0], line)?);
        }
        OperandForm::Ldc => {
            let constant = match operands.as_slice() {
                [Operand::Str(s)] => Constant::String(s.clone()),
                [Operand::Word(w)] => parse_constant(w)
                    .ok_or_else(|| operand_error(format!("invalid constant `{}`", w)))?,
                _ => return Err(operand_error("expected 1 operand".to_string())),
            };
            method.ldc(constant);
        }
        OperandForm::TableSwitch => {
            let w: Vec<&str> = operands.iter().filter_map(Operand::word).collect();
            let (min, max, targets, default) = match w.as_slice() {
                [min, max, targets @ .., "default", default] => (min, max, targets, default),
                _ => return Err(operand_error("expected min max targets default L".to_string())),
            };
            let targets = targets
                .iter()
                .map(|t| parse_label(t, line))
                .collect::<Result<Vec<_>, _>>()?;
            method.table_switch(
                parse_number(min, line)?,
                parse_number(max, line)?,
                parse_label(default, line)?,
                targets,
            );
        }
        OperandForm::LookupSwitch => {
            let w: Vec<&str> = operands.iter().filter_map(Operand::word).collect();
            let (cases, default) = match w.as_slice() {
                [cases @ .., "default", default] if cases.len() % 2 == 0 => (cases, default),
                _ => return Err(operand_error("expected key/label pairs and default L".to_string())),
            };
            let cases = cases
                .chunks(2)
                .map(|pair| Ok((parse_number(pair[0], line)?, parse_label(pair[1], line)?)))
                .collect::<Result<Vec<_>, ParseError>>()?;
            method.lookup_switch(parse_label(default, line)?, cases);
        }
        OperandForm::MultiANewArray => {
            let w = words(2)?;
            method.multi_anew_array(w[0], parse_number(w[1], line)?);
        }
        OperandForm::Wide => {
            return Err(operand_error(
                "write the widened instruction without the prefix".to_string(),
            ))
        }
    }
    Ok(())
}

fn parse_label(text: &str, line: usize) -> Result<LabelId, ParseError> {
    text.strip_prefix('L')
        .and_then(|n| n.parse().ok())
        .map(LabelId)
        .ok_or_else(|| ParseError::Operand {
            line,
            message: format!("invalid label `{}`", text),
        })
}

fn parse_number<T: std::str::FromStr>(text: &str, line: usize) -> Result<T, ParseError> {
    text.parse().map_err(|_| ParseError::Operand {
        line,
        message: format!("invalid number `{}`", text),
    })
}

/// `5`, `5L`, `1.5F`, `2.0D` or `java/lang/String.class`.
fn parse_constant(word: &str) -> Option<Constant> {
    if let Some(class) = word.strip_suffix(".class") {
        return Some(Constant::Class(class.to_string()));
    }
    if let Some(v) = word.strip_suffix('L') {
        return v.parse().ok().map(Constant::Long);
    }
    if let Some(v) = word.strip_suffix('F') {
        return v.parse().ok().map(Constant::Float);
    }
    if let Some(v) = word.strip_suffix('D') {
        return v.parse().ok().map(Constant::Double);
    }
    word.parse().ok().map(Constant::Int)
}

fn unescape(raw: &str, line: usize) -> Result<String, ParseError> {
    let invalid = |what: &str| ParseError::Operand {
        line,
        message: format!("invalid escape in string: {}", what),
    };
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let rest = chars.as_str();
                let code = rest
                    .strip_prefix('{')
                    .and_then(|r| r.split_once('}'))
                    .ok_or_else(|| invalid("\\u without braces"))?;
                let value = u32::from_str_radix(code.0, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(code.0))?;
                out.push(value);
                chars = code.1.chars();
            }
            Some(other) => return Err(invalid(&other.to_string())),
            None => return Err(invalid("trailing backslash")),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constants() {
        assert_eq!(parse_constant("5"), Some(Constant::Int(5)));
        assert_eq!(parse_constant("-7L"), Some(Constant::Long(-7)));
        assert_eq!(parse_constant("1.5F"), Some(Constant::Float(1.5)));
        assert_eq!(parse_constant("2.0D"), Some(Constant::Double(2.0)));
        assert_eq!(
            parse_constant("java/lang/String.class"),
            Some(Constant::Class("java/lang/String".to_string()))
        );
        assert_eq!(parse_constant("L3"), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"a\"b\\c\n"#, 1).unwrap(), "a\"b\\c\n");
        assert_eq!(unescape(r"\u{0001}x", 1).unwrap(), "\u{1}x");
        assert!(unescape(r"\q", 3).is_err());
    }
}
