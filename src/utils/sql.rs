//! Helpers para construir SQL contra el catálogo de referencia
//!
//! El dialecto del servicio de consultas no admite parámetros enlazados,
//! así que todo literal de texto pasa por `escape_sql` antes de interpolarse.

/// Duplica las comillas simples de un literal de texto.
pub fn escape_sql(input: &str) -> String {
    input.replace('\'', "''")
}

/// Formatea la cilindrada sin ceros finales, como la guarda la columna `liter`
/// del catálogo (tipo texto): 6.70 → "6.7", 5.00 → "5".
pub fn format_displacement(liters: f64) -> String {
    // Display de f64 ya produce la representación más corta sin ceros de relleno
    if liters.fract() == 0.0 && liters.abs() < 1e15 {
        format!("{}", liters as i64)
    } else {
        format!("{}", liters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_sql_doubles_single_quotes() {
        assert_eq!(escape_sql("Ford"), "Ford");
        assert_eq!(escape_sql("O'Brien"), "O''Brien");
        assert_eq!(escape_sql("x' OR '1'='1"), "x'' OR ''1''=''1");
    }

    #[test]
    fn test_format_displacement_strips_trailing_zeros() {
        assert_eq!(format_displacement(6.7), "6.7");
        assert_eq!(format_displacement(6.70), "6.7");
        assert_eq!(format_displacement(5.0), "5");
        assert_eq!(format_displacement(2.0), "2");
        assert_eq!(format_displacement(3.5), "3.5");
        assert_eq!(format_displacement(1.75), "1.75");
    }
}
