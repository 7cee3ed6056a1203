// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::num::ParseIntError;

/// A simple trait allowing something to be converted into a hex
/// string.
pub trait ToHexString {
    fn to_hex_string(&self) -> String;
}

/// A simple trait allowing something to be converted from a hex
/// string.
pub trait FromHexString {
    type Error;

    fn from_hex_string(&self) -> Result<Vec<u8>, Self::Error>;
}

impl ToHexString for [u8] {
    fn to_hex_string(&self) -> String {
        let digits: String = self.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{digits}")
    }
}

impl FromHexString for str {
    type Error = ParseIntError;

    fn from_hex_string(&self) -> Result<Vec<u8>, Self::Error> {
        let digits = self.strip_prefix("0x").unwrap_or(self);
        let mut bytes = Vec::with_capacity((digits.len() + 1) / 2);
        // An odd number of digits implies a zero lead.
        let mut from = 0;
        if digits.len() % 2 != 0 {
            bytes.push(u8::from_str_radix(&digits[..1], 16)?);
            from = 1;
        }
        for i in (from..digits.len()).step_by(2) {
            bytes.push(u8::from_str_radix(&digits[i..i + 2], 16)?);
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!([0x60u8, 0x2a].to_hex_string(), "0x602a");
        assert_eq!([0u8; 0].to_hex_string(), "0x");
    }

    #[test]
    fn test_from_hex() {
        assert_eq!("0x602a".from_hex_string().unwrap(), vec![0x60, 0x2a]);
        assert_eq!("602a".from_hex_string().unwrap(), vec![0x60, 0x2a]);
        assert_eq!("0xf01".from_hex_string().unwrap(), vec![0x0f, 0x01]);
        assert!("0xzz".from_hex_string().is_err());
    }
}
